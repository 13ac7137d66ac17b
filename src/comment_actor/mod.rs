mod service;

pub use service::CommentService;
