// SPDX-License-Identifier: GPL-3.0-or-later

use crate::oracle::{Color, CompositeOp, PixelFormat};

/// How an image repeats when sampled outside its bounds.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Repeat {
    None,
    Normal,
    Pad,
    Reflect,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rectangle {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Rectangle {
        assert!(w > 0 && h > 0);
        Rectangle { x, y, w, h }
    }
}

/// The compositing engine under test.
///
/// This is the whole external surface the harness consumes; everything
/// behind it is a black box. Calls are assumed to succeed: an engine
/// that silently does the wrong thing shows up as a case mismatch, not
/// as an error return. Images are released by dropping them.
pub trait CompositeEngine {
    type Image;

    fn create_image(&mut self, format: PixelFormat, width: u32, height: u32) -> Self::Image;

    fn create_solid(&mut self, color: Color) -> Self::Image;

    /// Fills with SRC semantics: the rectangle is overwritten, not
    /// blended.
    fn fill_rect(&mut self, image: &mut Self::Image, color: Color, rect: Rectangle);

    fn set_repeat(&mut self, image: &mut Self::Image, repeat: Repeat);

    fn set_component_alpha(&mut self, image: &mut Self::Image, enabled: bool);

    #[allow(clippy::too_many_arguments)]
    fn composite(
        &mut self,
        op: CompositeOp,
        src: &Self::Image,
        mask: Option<&Self::Image>,
        dst: &mut Self::Image,
        src_offset: (i32, i32),
        mask_offset: (i32, i32),
        dst_offset: (i32, i32),
        width: u32,
        height: u32,
    );

    /// The first pixel of the image as the raw word a full native-word
    /// read would return.
    fn read_pixel(&self, image: &Self::Image) -> u64;
}
