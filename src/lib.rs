pub mod str_utils;
pub mod text_buffer;
