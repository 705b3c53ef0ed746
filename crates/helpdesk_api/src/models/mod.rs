mod attachment;
mod comment;

pub use attachment::AttachmentMetadata;
pub use comment::Comment;
