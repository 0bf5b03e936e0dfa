mod thread;
mod twitter;
mod types;

pub use thread::ThreadPublisher;
pub use twitter::TwitterGateway;
pub use types::{
    NewPost, PostError, PostGateway, PostId, PostReceipt, PublishedThread, ThreadPost,
    ThreadPublishError,
};
