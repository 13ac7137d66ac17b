use tokio::sync::mpsc;

use crate::domain::{Comment, CommentId, Reel, ReelId};
use crate::error::CommentError;
use crate::messages::CommentRequest;

/// Client for the comment service.
#[derive(Clone, Debug)]
pub struct CommentClient {
    sender: mpsc::Sender<CommentRequest>,
}

impl CommentClient {
    pub fn new(sender: mpsc::Sender<CommentRequest>) -> Self {
        Self { sender }
    }
}

client_shutdown!(CommentClient, CommentRequest);

client_method!(CommentClient => fn add_comment(reel: ReelId, text: String) -> Vec<Comment> as CommentRequest::Add, Error = CommentError);
client_method!(CommentClient => fn delete_comment(reel: ReelId, comment: CommentId) -> Vec<Comment> as CommentRequest::Delete, Error = CommentError);
client_method!(CommentClient => fn add_reply(reel: ReelId, comment: CommentId, text: String) -> Vec<Comment> as CommentRequest::AddReply, Error = CommentError);
client_method!(CommentClient => fn delete_reply(reel: ReelId, comment: CommentId, reply: CommentId) -> Vec<Comment> as CommentRequest::DeleteReply, Error = CommentError);
client_method!(CommentClient => fn comments(reel: ReelId) -> Vec<Comment> as CommentRequest::List, Error = CommentError);
client_method!(CommentClient => fn comment_count(reel: ReelId) -> usize as CommentRequest::Count, Error = CommentError);
client_method!(CommentClient => fn seed_from_reels(reels: Vec<Reel>) -> () as CommentRequest::Seed, Error = CommentError);
