//! 后台请求线程
//!
//! UI 线程通过 channel 提交请求，worker 串行执行阻塞 HTTP 调用并回传结果。
//! 列表类请求带有单调递增的序号，只有最新序号的结果会被界面采纳；
//! 已被新请求取代的列表请求在 worker 端直接跳过。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use log::{debug, error};

use crate::api::TriviaApi;
use crate::error::ApiError;
use crate::models::{NewQuestion, QuestionsPayload};

/// 列表类请求，成功后整体替换界面状态
#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
    Page(usize),
    Category(i64),
    Search(String),
}

/// 提交给 worker 的请求
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Listing { seq: u64, listing: Listing },
    Delete(i64),
    Create(NewQuestion),
}

/// worker 回传的结果
#[derive(Debug)]
pub enum Reply {
    Listing {
        seq: u64,
        listing: Listing,
        result: Result<QuestionsPayload, ApiError>,
    },
    Deleted {
        id: i64,
        result: Result<(), ApiError>,
    },
    Created {
        result: Result<(), ApiError>,
    },
}

enum Command {
    Run(Request),
    Shutdown,
}

/// 后台 worker 句柄
pub struct FetchWorker {
    command_tx: Sender<Command>,
    reply_rx: Receiver<Reply>,
    latest_listing: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl FetchWorker {
    /// 启动 worker 线程
    pub fn spawn<A>(api: A) -> Self
    where
        A: TriviaApi + Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::channel();
        let (reply_tx, reply_rx) = mpsc::channel();
        let latest_listing = Arc::new(AtomicU64::new(0));
        let thread_latest = Arc::clone(&latest_listing);

        let handle = thread::spawn(move || worker_loop(&api, command_rx, reply_tx, thread_latest));

        Self {
            command_tx,
            reply_rx,
            latest_listing,
            handle: Some(handle),
        }
    }

    /// 提交请求
    pub fn submit(&self, request: Request) {
        if let Request::Listing { seq, .. } = &request {
            self.latest_listing.fetch_max(*seq, Ordering::SeqCst);
        }
        if self.command_tx.send(Command::Run(request)).is_err() {
            error!("fetch worker is gone, request dropped");
        }
    }

    /// 非阻塞地取出一个结果
    pub fn try_recv(&self) -> Option<Reply> {
        match self.reply_rx.try_recv() {
            Ok(reply) => Some(reply),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                error!("fetch worker disconnected");
                None
            }
        }
    }

    /// 阻塞等待一个结果
    #[cfg(test)]
    pub fn recv(&self) -> Option<Reply> {
        self.reply_rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .ok()
    }

    /// 通知 worker 退出并等待线程结束
    pub fn shutdown(mut self) {
        let _ = self.command_tx.send(Command::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("fetch worker panicked");
            }
        }
    }
}

fn worker_loop(
    api: &dyn TriviaApi,
    command_rx: Receiver<Command>,
    reply_tx: Sender<Reply>,
    latest_listing: Arc<AtomicU64>,
) {
    while let Ok(command) = command_rx.recv() {
        let request = match command {
            Command::Run(request) => request,
            Command::Shutdown => break,
        };
        if let Some(reply) = execute(api, request, &latest_listing) {
            if reply_tx.send(reply).is_err() {
                break;
            }
        }
    }
    debug!("fetch worker stopped");
}

/// 执行单个请求；已过期的列表请求返回 None
fn execute(api: &dyn TriviaApi, request: Request, latest_listing: &AtomicU64) -> Option<Reply> {
    match request {
        Request::Listing { seq, listing } => {
            if seq < latest_listing.load(Ordering::SeqCst) {
                debug!("skipping superseded listing #{seq}: {listing:?}");
                return None;
            }
            let result = match &listing {
                Listing::Page(page) => api.list_questions(*page),
                Listing::Category(id) => api.questions_by_category(*id),
                Listing::Search(term) => api.search_questions(term),
            };
            Some(Reply::Listing {
                seq,
                listing,
                result,
            })
        }
        Request::Delete(id) => Some(Reply::Deleted {
            id,
            result: api.delete_question(id),
        }),
        Request::Create(question) => Some(Reply::Created {
            result: api.create_question(&question),
        }),
    }
}
