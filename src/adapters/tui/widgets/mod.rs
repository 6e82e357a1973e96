pub mod search_bar;
pub mod task_form;

pub use search_bar::SearchBar;
pub use task_form::{FormField, FormMode, TaskForm};
