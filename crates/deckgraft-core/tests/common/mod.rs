#![allow(dead_code)]

pub mod fixtures;
pub mod validator;

pub use fixtures::{picture_shape, table_frame, text_shape, DeckFixture, SlideSpec, PNG_BYTES};
pub use validator::{assert_valid, part_text, slide_ids, slide_parts, validate_package};
