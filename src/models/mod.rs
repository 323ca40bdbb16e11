pub mod credentials;
pub mod document;
pub mod form;
pub mod loaders;
pub mod nationality;

pub use credentials::{parse_capture, Credentials};
pub use document::{build_submission_fields, Attachment, DocumentRecord};
pub use form::FormField;
pub use loaders::{load_all_documents, load_document_record};
pub use nationality::{NationalityEntry, NationalityTable};
