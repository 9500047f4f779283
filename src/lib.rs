pub mod bitmap_font;
pub mod label_font;
pub mod manifest;
pub mod sprite_gen;
pub mod sprite_table;
