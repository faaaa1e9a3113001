pub mod local_document_source;

pub use local_document_source::LocalDocumentSource;
