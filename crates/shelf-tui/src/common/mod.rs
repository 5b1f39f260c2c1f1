pub mod form;
pub mod task;
pub mod text;
pub mod text_field;

pub use form::{Form, FormField, FormKey};
pub use task::{TaskId, TaskKind, TaskSeq, TaskState};
pub use text::{stars, truncate_start_with_ellipsis, truncate_with_ellipsis};
pub use text_field::TextField;
