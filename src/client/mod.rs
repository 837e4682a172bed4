//! Backend access: the token-carrying request pipeline and the typed endpoint wrappers
//! built on it.

mod pipeline;
pub mod auth;
pub mod courses;
pub mod lessons;

pub use pipeline::RequestPipeline;
pub use auth::{sign_in, AuthApi, LoginRequest, LoginResponse, RegisterRequest};
pub use courses::{filter_courses, Course, CourseInput, CoursesApi};
pub use lessons::{course_with_lessons, Lesson, LessonInput, LessonsApi};
