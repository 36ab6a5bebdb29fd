pub mod output;

pub use output::{slugify, write_lessons_to_directory, LessonFileInfo};
