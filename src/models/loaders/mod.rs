pub mod json_loader;

pub use json_loader::{load_all_documents, load_document_record};
