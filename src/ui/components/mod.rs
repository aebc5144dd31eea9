mod alert;
mod confirm;
mod input;
mod key_result;
mod post_form;

pub use alert::{Alert, AlertKind};
pub use confirm::{ConfirmDialog, ConfirmEvent};
pub use key_result::KeyResult;
pub use post_form::{FormEvent, FormField, PostForm, Submission};
