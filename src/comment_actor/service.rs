use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};

use crate::clients::CommentClient;
use crate::domain::{Comment, CommentId, Reel, ReelId};
use crate::error::CommentError;
use crate::messages::{CommentRequest, ServiceResponse};
use crate::remote::RemoteStore;
use crate::session::Session;

/// Comment threads per reel. Not optimistic: the list only changes after the
/// server confirmed, and add/reply take the server's list wholesale.
pub struct CommentService {
    receiver: mpsc::Receiver<CommentRequest>,
    remote: Arc<dyn RemoteStore>,
    session: Session,
    threads: HashMap<ReelId, Vec<Comment>>,
}

impl CommentService {
    pub fn new(buffer_size: usize, remote: Arc<dyn RemoteStore>, session: Session) -> (Self, CommentClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            remote,
            session,
            threads: HashMap::new(),
        };
        (service, CommentClient::new(sender))
    }

    #[instrument(name = "comment_service", skip(self))]
    pub async fn run(mut self) {
        info!("CommentService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CommentRequest::Add { reel, text, respond_to } => {
                    self.handle_add(reel, text, respond_to).await;
                }
                CommentRequest::Delete {
                    reel,
                    comment,
                    respond_to,
                } => {
                    self.handle_delete(reel, comment, respond_to).await;
                }
                CommentRequest::AddReply {
                    reel,
                    comment,
                    text,
                    respond_to,
                } => {
                    self.handle_add_reply(reel, comment, text, respond_to).await;
                }
                CommentRequest::DeleteReply {
                    reel,
                    comment,
                    reply,
                    respond_to,
                } => {
                    self.handle_delete_reply(reel, comment, reply, respond_to).await;
                }
                CommentRequest::List { reel, respond_to } => {
                    let _ = respond_to.send(Ok(self.thread(&reel)));
                }
                CommentRequest::Count { reel, respond_to } => {
                    let count = self.threads.get(&reel).map_or(0, Vec::len);
                    let _ = respond_to.send(Ok(count));
                }
                CommentRequest::Seed { reels, respond_to } => {
                    self.handle_seed(reels);
                    let _ = respond_to.send(Ok(()));
                }
                CommentRequest::Shutdown => {
                    info!("CommentService shutting down");
                    break;
                }
            }
        }

        info!("CommentService stopped");
    }

    #[instrument(fields(reel = %reel), skip(self, text, respond_to))]
    async fn handle_add(&mut self, reel: ReelId, text: String, respond_to: ServiceResponse<Vec<Comment>, CommentError>) {
        debug!("Processing add_comment request");
        let Some(identity) = self.session.identity() else {
            self.ignore_signed_out(&reel, respond_to);
            return;
        };

        let result = match self.remote.add_comment(reel.clone(), text, identity.name).await {
            Ok(thread) => {
                info!(comments = thread.len(), "Comment added");
                self.threads.insert(reel, thread.clone());
                Ok(thread)
            }
            Err(e) => {
                error!(error = %e, "Error adding comment");
                Err(e.into())
            }
        };
        let _ = respond_to.send(result);
    }

    #[instrument(fields(reel = %reel, comment = %comment), skip(self, respond_to))]
    async fn handle_delete(
        &mut self,
        reel: ReelId,
        comment: CommentId,
        respond_to: ServiceResponse<Vec<Comment>, CommentError>,
    ) {
        debug!("Processing delete_comment request");
        if !self.session.is_authenticated() {
            self.ignore_signed_out(&reel, respond_to);
            return;
        }

        let result = match self.remote.delete_comment(reel.clone(), comment.clone()).await {
            Ok(()) => {
                let thread = self.threads.entry(reel.clone()).or_default();
                thread.retain(|existing| existing.id != comment);
                info!("Comment deleted");
                Ok(self.thread(&reel))
            }
            Err(e) => {
                error!(error = %e, "Error deleting comment");
                Err(e.into())
            }
        };
        let _ = respond_to.send(result);
    }

    #[instrument(fields(reel = %reel, comment = %comment), skip(self, text, respond_to))]
    async fn handle_add_reply(
        &mut self,
        reel: ReelId,
        comment: CommentId,
        text: String,
        respond_to: ServiceResponse<Vec<Comment>, CommentError>,
    ) {
        debug!("Processing add_reply request");
        if !self.session.is_authenticated() {
            self.ignore_signed_out(&reel, respond_to);
            return;
        }

        let result = match self.remote.add_reply(reel.clone(), comment, text).await {
            Ok(thread) => {
                info!("Reply added");
                self.threads.insert(reel, thread.clone());
                Ok(thread)
            }
            Err(e) => {
                error!(error = %e, "Error adding reply");
                Err(e.into())
            }
        };
        let _ = respond_to.send(result);
    }

    #[instrument(fields(reel = %reel, comment = %comment, reply = %reply), skip(self, respond_to))]
    async fn handle_delete_reply(
        &mut self,
        reel: ReelId,
        comment: CommentId,
        reply: CommentId,
        respond_to: ServiceResponse<Vec<Comment>, CommentError>,
    ) {
        debug!("Processing delete_reply request");
        if !self.session.is_authenticated() {
            self.ignore_signed_out(&reel, respond_to);
            return;
        }

        let result = match self.remote.delete_reply(reel.clone(), comment.clone(), reply.clone()).await {
            Ok(()) => {
                if let Some(parent) = self
                    .threads
                    .get_mut(&reel)
                    .and_then(|thread| thread.iter_mut().find(|existing| existing.id == comment))
                {
                    parent.replies.retain(|existing| existing.id != reply);
                }
                info!("Reply deleted");
                Ok(self.thread(&reel))
            }
            Err(e) => {
                error!(error = %e, "Error deleting reply");
                Err(e.into())
            }
        };
        let _ = respond_to.send(result);
    }

    /// Replaces every thread with the ones embedded in `reels`.
    fn handle_seed(&mut self, reels: Vec<Reel>) {
        self.threads = reels
            .into_iter()
            .filter(|reel| !reel.id.is_empty())
            .map(|reel| (reel.id, reel.comments))
            .collect();
        debug!(reels = self.threads.len(), "Comment threads seeded");
    }

    /// Signed-out writes are no-ops: nothing is sent and the current thread comes back.
    fn ignore_signed_out(&self, reel: &str, respond_to: ServiceResponse<Vec<Comment>, CommentError>) {
        debug!("Ignored, no signed-in user");
        let _ = respond_to.send(Ok(self.thread(reel)));
    }

    fn thread(&self, reel: &str) -> Vec<Comment> {
        self.threads.get(reel).cloned().unwrap_or_default()
    }
}
