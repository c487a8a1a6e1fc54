//! 业务逻辑处理 (Update/Dispatch)
//!
//! 包含核心的 dispatch 逻辑、各类请求的发起以及响应的合并

use log::{debug, error, info, warn};

use super::actions::Action;
use super::state::{App, AppMode, ConfirmAction, Focus, InputField, NoticeLevel, QuestionDraft};
use crate::fetch::{Listing, Reply, Request};

impl App {
    /// 核心逻辑分发
    pub fn dispatch(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return true,
            Action::MoveSelectionUp => self.move_up(),
            Action::MoveSelectionDown => self.move_down(),
            Action::SwitchFocus => self.switch_focus(),
            Action::Activate => self.activate(),

            Action::NextPage => self.select_page(self.list.page + 1),
            Action::PrevPage => {
                if self.list.page > 1 {
                    self.select_page(self.list.page - 1);
                }
            }
            Action::SelectPage(page) => self.select_page(page),
            Action::Reload => self.load_page(self.list.page),

            Action::StartSearch => self.start_search(),
            Action::StartAddQuestion => self.start_add_question(),
            Action::StartDeleteQuestion => self.start_delete_question(),

            Action::NextField => self.next_field(),
            Action::Cancel => self.cancel(),

            Action::Submit => match &self.mode {
                AppMode::Searching => {
                    let term = std::mem::take(&mut self.input_buffer);
                    self.mode = AppMode::Normal;
                    self.submit_search(&term);
                }
                AppMode::AddingQuestion => match self.input_field.next() {
                    Some(field) => self.input_field = field,
                    None => self.submit_question(),
                },
                AppMode::Confirm(_) => self.execute_confirm(),
                AppMode::Normal => {}
            },

            Action::Input(c) => match self.mode {
                AppMode::Searching => self.input_buffer.push(c),
                AppMode::AddingQuestion => self.draft.field_mut(self.input_field).push(c),
                _ => {}
            },

            Action::DeleteChar => match self.mode {
                AppMode::Searching => {
                    self.input_buffer.pop();
                }
                AppMode::AddingQuestion => {
                    self.draft.field_mut(self.input_field).pop();
                }
                _ => {}
            },
        }
        false
    }

    // ============ 导航相关 ============

    /// 向上移动选择
    pub fn move_up(&mut self) {
        let index = match self.focus {
            Focus::Categories => &mut self.selected_category,
            Focus::Questions => &mut self.selected_question,
        };
        *index = index.saturating_sub(1);
    }

    /// 向下移动选择
    pub fn move_down(&mut self) {
        let (index, len) = match self.focus {
            Focus::Categories => (&mut self.selected_category, self.list.categories.len()),
            Focus::Questions => (&mut self.selected_question, self.list.questions.len()),
        };
        if *index + 1 < len {
            *index += 1;
        }
    }

    pub fn switch_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Categories => Focus::Questions,
            Focus::Questions => Focus::Categories,
        };
    }

    fn activate(&mut self) {
        match self.focus {
            Focus::Categories => {
                if let Some((id, _)) = self.selected_category() {
                    self.load_by_category(id);
                }
            }
            Focus::Questions => self.toggle_answer(),
        }
    }

    /// 显示/隐藏选中题目的答案
    pub fn toggle_answer(&mut self) {
        if let Some(id) = self.selected_question().map(|q| q.id) {
            self.revealed = if self.revealed == Some(id) { None } else { Some(id) };
        }
    }

    // ============ 请求相关 ============

    /// 启动时加载第一页
    pub fn mount(&mut self) {
        self.load_page(1);
    }

    /// 加载指定页
    pub fn load_page(&mut self, page: usize) {
        self.list = self.list.with_page(page);
        self.issue_listing(Listing::Page(page));
    }

    /// 选择页码，只接受现有的页码按钮
    pub fn select_page(&mut self, page: usize) {
        if (1..=self.list.page_count()).contains(&page) {
            self.load_page(page);
        }
    }

    /// 按分类加载
    pub fn load_by_category(&mut self, category_id: i64) {
        self.issue_listing(Listing::Category(category_id));
    }

    /// 提交搜索，空白搜索词不发请求
    pub fn submit_search(&mut self, term: &str) {
        let term = term.trim();
        if term.is_empty() {
            self.set_notice(NoticeLevel::Info, "请输入有效的搜索词");
            return;
        }
        debug!("searching for {term:?}");
        self.issue_listing(Listing::Search(term.to_string()));
    }

    fn submit_question(&mut self) {
        match self.draft.to_new_question() {
            Some(question) => {
                self.enqueue(Request::Create(question));
                self.draft = QuestionDraft::default();
                self.input_field = InputField::Question;
                self.mode = AppMode::Normal;
            }
            None => self.set_notice(NoticeLevel::Error, "请完整填写题目、答案、分类 id 和难度"),
        }
    }

    /// 合并 worker 回传的结果
    pub fn handle_reply(&mut self, reply: Reply) {
        match reply {
            Reply::Listing {
                seq,
                listing,
                result,
            } => {
                if seq != self.latest_listing {
                    debug!(
                        "dropping stale reply #{seq} (latest #{}) for {listing:?}",
                        self.latest_listing
                    );
                    return;
                }
                self.loading = false;
                match result {
                    Ok(payload) => {
                        if self.notice.as_ref().is_some_and(|n| seq > n.after_listing) {
                            self.notice = None;
                        }
                        if matches!(listing, Listing::Search(_)) && payload.questions.is_empty() {
                            self.set_notice(NoticeLevel::Info, "未找到匹配的题目");
                        }
                        self.list = self.list.reconciled(&listing, payload);
                        self.revealed = None;
                        self.clamp_selection();
                    }
                    Err(e) => {
                        error!("unable to load {listing:?}: {e}");
                        if matches!(listing, Listing::Search(_)) {
                            self.set_notice(NoticeLevel::Error, "无法加载搜索结果，请重试");
                        }
                    }
                }
            }
            Reply::Deleted { id, result } => match result {
                Ok(()) => {
                    info!("deleted question {id}");
                    self.load_page(self.list.page);
                }
                Err(e) => error!("unable to delete question {id}: {e}"),
            },
            Reply::Created { result } => match result {
                Ok(()) => {
                    info!("question created");
                    self.load_page(self.list.page);
                    self.set_notice(NoticeLevel::Info, "题目已添加");
                }
                Err(e) => {
                    warn!("unable to create question: {e}");
                    self.set_notice(NoticeLevel::Error, "添加题目失败");
                }
            },
        }
    }

    // ============ 搜索/添加/删除相关 ============

    /// 开始搜索
    pub fn start_search(&mut self) {
        self.mode = AppMode::Searching;
        self.input_buffer.clear();
    }

    /// 开始添加题目
    pub fn start_add_question(&mut self) {
        self.mode = AppMode::AddingQuestion;
        self.draft = QuestionDraft::default();
        self.input_field = InputField::Question;
        // 从分类面板发起时预填分类
        if self.focus == Focus::Categories {
            if let Some((id, _)) = self.selected_category() {
                self.draft.category = id.to_string();
            }
        }
    }

    fn next_field(&mut self) {
        if self.mode == AppMode::AddingQuestion {
            self.input_field = self.input_field.next().unwrap_or(InputField::Question);
        }
    }

    /// 开始删除题目，等待确认
    pub fn start_delete_question(&mut self) {
        if self.focus != Focus::Questions {
            return;
        }
        if let Some(id) = self.selected_question().map(|q| q.id) {
            self.mode = AppMode::Confirm(ConfirmAction::Delete(id));
        }
    }

    /// 执行确认操作
    pub fn execute_confirm(&mut self) {
        if let AppMode::Confirm(ConfirmAction::Delete(id)) = self.mode {
            self.enqueue(Request::Delete(id));
        }
        self.mode = AppMode::Normal;
    }

    // ============ 通用操作 ============

    /// 取消当前操作
    pub fn cancel(&mut self) {
        self.mode = AppMode::Normal;
        self.input_buffer.clear();
        self.notice = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::models::QuestionsPayload;
    use crate::fetch::FetchWorker;
    use crate::testing::{FakeApi, sample_categories, sample_payload};

    /// 启动并让第一页以给定响应返回
    fn loaded_app(payload: QuestionsPayload) -> App {
        let mut app = App::new();
        app.mount();
        let requests = app.take_requests();
        assert_eq!(requests.len(), 1);
        app.handle_reply(Reply::Listing {
            seq: app.latest_listing,
            listing: Listing::Page(1),
            result: Ok(payload),
        });
        app
    }

    fn server_error() -> ApiError {
        ApiError::Status {
            status: 500,
            url: "/questions".to_string(),
        }
    }

    #[test]
    fn test_mount_requests_first_page() {
        let mut app = App::new();
        app.mount();
        assert_eq!(
            app.take_requests(),
            vec![Request::Listing {
                seq: 1,
                listing: Listing::Page(1)
            }]
        );
    }

    #[test]
    fn test_page_load_yields_controls_and_entries() {
        let app = loaded_app(sample_payload(5, 12));
        assert_eq!(app.list.questions.len(), 5);
        assert_eq!(app.list.page_controls().len(), 2);
        assert!(!app.loading);
    }

    #[test]
    fn test_blank_search_sends_nothing() {
        let mut app = loaded_app(sample_payload(5, 12));
        for term in ["", "   ", "\t \n"] {
            app.submit_search(term);
            assert!(app.pending_requests().is_empty());
        }
        let notice = app.notice.as_ref().unwrap();
        assert_eq!(notice.level, NoticeLevel::Info);
    }

    #[test]
    fn test_search_sends_trimmed_term() {
        let mut app = loaded_app(sample_payload(5, 12));
        app.dispatch(Action::StartSearch);
        for c in "  title ".chars() {
            app.dispatch(Action::Input(c));
        }
        app.dispatch(Action::Submit);

        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(
            app.take_requests(),
            vec![Request::Listing {
                seq: 2,
                listing: Listing::Search("title".to_string())
            }]
        );
    }

    #[test]
    fn test_empty_search_result_shows_notice_and_clears_list() {
        let mut app = loaded_app(sample_payload(5, 12));
        app.submit_search("nothing matches");
        app.take_requests();
        app.handle_reply(Reply::Listing {
            seq: app.latest_listing,
            listing: Listing::Search("nothing matches".to_string()),
            result: Ok(QuestionsPayload::default()),
        });

        assert!(app.list.questions.is_empty());
        assert_eq!(app.list.total_questions, 0);
        assert!(app.list.page_controls().is_empty());
        assert_eq!(app.notice.as_ref().unwrap().text, "未找到匹配的题目");
        // 分类沿用缓存
        assert_eq!(app.list.categories, sample_categories());
    }

    #[test]
    fn test_failed_search_keeps_state() {
        let mut app = loaded_app(sample_payload(5, 12));
        let before = app.list.clone();
        app.submit_search("science");
        app.take_requests();
        app.handle_reply(Reply::Listing {
            seq: app.latest_listing,
            listing: Listing::Search("science".to_string()),
            result: Err(server_error()),
        });

        assert_eq!(app.list, before);
        assert_eq!(app.notice.as_ref().unwrap().level, NoticeLevel::Error);
        assert!(!app.loading);
    }

    #[test]
    fn test_failed_page_load_keeps_state_silently() {
        let mut app = loaded_app(sample_payload(5, 12));
        let questions = app.list.questions.clone();
        app.dispatch(Action::SelectPage(2));
        app.take_requests();
        app.handle_reply(Reply::Listing {
            seq: app.latest_listing,
            listing: Listing::Page(2),
            result: Err(server_error()),
        });

        assert_eq!(app.list.questions, questions);
        assert!(app.notice.is_none());
    }

    #[test]
    fn test_select_category_keeps_categories() {
        let mut app = loaded_app(sample_payload(5, 12));
        app.dispatch(Action::SwitchFocus);
        app.dispatch(Action::MoveSelectionDown);
        app.dispatch(Action::MoveSelectionDown);
        assert_eq!(app.selected_category(), Some((3, "Geography")));

        app.dispatch(Action::Activate);
        assert_eq!(
            app.take_requests(),
            vec![Request::Listing {
                seq: 2,
                listing: Listing::Category(3)
            }]
        );

        app.handle_reply(Reply::Listing {
            seq: 2,
            listing: Listing::Category(3),
            result: Ok(QuestionsPayload {
                categories: None,
                current_category: Some("Geography".to_string()),
                ..sample_payload(2, 2)
            }),
        });
        assert_eq!(app.list.categories, sample_categories());
        assert_eq!(app.list.current_category.as_deref(), Some("Geography"));
    }

    #[test]
    fn test_category_request_for_science() {
        let mut app = App::new();
        app.list.categories = [(3, "Science".to_string())].into_iter().collect();
        let categories = app.list.categories.clone();

        app.focus = Focus::Categories;
        app.dispatch(Action::Activate);

        assert!(matches!(
            app.pending_requests(),
            [Request::Listing {
                listing: Listing::Category(3),
                ..
            }]
        ));
        assert_eq!(app.list.categories, categories);
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut app = loaded_app(sample_payload(5, 12));
        app.dispatch(Action::MoveSelectionDown);
        app.dispatch(Action::StartDeleteQuestion);
        assert_eq!(app.mode, AppMode::Confirm(ConfirmAction::Delete(2)));
        assert!(app.pending_requests().is_empty());

        app.dispatch(Action::Cancel);
        assert_eq!(app.mode, AppMode::Normal);
        assert!(app.pending_requests().is_empty());
    }

    #[test]
    fn test_confirmed_delete_refetches_same_page_once() {
        let mut app = loaded_app(sample_payload(10, 25));
        app.dispatch(Action::SelectPage(2));
        let seq = app.latest_listing;
        app.take_requests();
        app.handle_reply(Reply::Listing {
            seq,
            listing: Listing::Page(2),
            result: Ok(sample_payload(10, 25)),
        });

        app.dispatch(Action::StartDeleteQuestion);
        app.dispatch(Action::Submit);
        assert_eq!(app.take_requests(), vec![Request::Delete(1)]);

        app.handle_reply(Reply::Deleted {
            id: 1,
            result: Ok(()),
        });
        assert_eq!(
            app.take_requests(),
            vec![Request::Listing {
                seq: seq + 1,
                listing: Listing::Page(2)
            }]
        );
    }

    #[test]
    fn test_failed_delete_does_not_refetch() {
        let mut app = loaded_app(sample_payload(5, 12));
        app.handle_reply(Reply::Deleted {
            id: 1,
            result: Err(server_error()),
        });
        assert!(app.pending_requests().is_empty());
    }

    #[test]
    fn test_stale_listing_reply_is_dropped() {
        let mut app = loaded_app(sample_payload(10, 30));
        app.dispatch(Action::SelectPage(2));
        app.dispatch(Action::SelectPage(3));
        app.take_requests();

        // 第 3 页先返回，第 2 页的旧响应随后到达
        app.handle_reply(Reply::Listing {
            seq: app.latest_listing,
            listing: Listing::Page(3),
            result: Ok(sample_payload(10, 30)),
        });
        let snapshot = app.list.clone();
        app.handle_reply(Reply::Listing {
            seq: app.latest_listing - 1,
            listing: Listing::Page(2),
            result: Ok(sample_payload(1, 1)),
        });

        assert_eq!(app.list, snapshot);
        assert_eq!(app.list.page, 3);
    }

    #[test]
    fn test_page_selection_stays_within_controls() {
        let mut app = loaded_app(sample_payload(5, 12));
        app.dispatch(Action::SelectPage(3));
        app.dispatch(Action::PrevPage);
        assert!(app.pending_requests().is_empty());

        app.dispatch(Action::NextPage);
        assert_eq!(app.list.page, 2);
        assert_eq!(app.take_requests().len(), 1);

        app.dispatch(Action::NextPage);
        assert!(app.pending_requests().is_empty());
    }

    #[test]
    fn test_reload_uses_current_page() {
        let mut app = loaded_app(sample_payload(10, 25));
        app.dispatch(Action::SelectPage(3));
        app.take_requests();
        app.dispatch(Action::Reload);
        assert!(matches!(
            app.take_requests().as_slice(),
            [Request::Listing {
                listing: Listing::Page(3),
                ..
            }]
        ));
    }

    #[test]
    fn test_add_question_flow() {
        let mut app = loaded_app(sample_payload(5, 12));
        app.dispatch(Action::StartAddQuestion);
        let fields = [
            ("Who painted Guernica?", false),
            ("Picasso", false),
            ("2", false),
            ("3", true),
        ];
        for (text, last) in fields {
            for c in text.chars() {
                app.dispatch(Action::Input(c));
            }
            app.dispatch(Action::Submit);
            assert_eq!(app.mode == AppMode::Normal, last);
        }

        match app.take_requests().as_slice() {
            [Request::Create(question)] => {
                assert_eq!(question.question, "Who painted Guernica?");
                assert_eq!(question.category, 2);
                assert_eq!(question.difficulty, 3);
            }
            other => panic!("unexpected requests: {other:?}"),
        }

        app.handle_reply(Reply::Created { result: Ok(()) });
        assert_eq!(app.notice.as_ref().unwrap().level, NoticeLevel::Info);
        assert_eq!(app.take_requests().len(), 1);
    }

    #[test]
    fn test_incomplete_question_sends_nothing() {
        let mut app = loaded_app(sample_payload(5, 12));
        app.dispatch(Action::StartAddQuestion);
        app.dispatch(Action::Input('?'));
        app.input_field = InputField::Difficulty;
        app.dispatch(Action::Submit);

        assert_eq!(app.mode, AppMode::AddingQuestion);
        assert!(app.pending_requests().is_empty());
        assert_eq!(app.notice.as_ref().unwrap().level, NoticeLevel::Error);
    }

    #[test]
    fn test_toggle_answer() {
        let mut app = loaded_app(sample_payload(5, 12));
        app.dispatch(Action::Activate);
        assert_eq!(app.revealed, Some(1));
        app.dispatch(Action::Activate);
        assert_eq!(app.revealed, None);
    }

    #[test]
    fn test_accepted_reply_clears_old_notice() {
        let mut app = loaded_app(sample_payload(5, 12));
        app.submit_search("nothing matches");
        app.take_requests();
        app.handle_reply(Reply::Listing {
            seq: app.latest_listing,
            listing: Listing::Search("nothing matches".to_string()),
            result: Ok(QuestionsPayload::default()),
        });
        assert!(app.notice.is_some());

        app.dispatch(Action::Reload);
        app.take_requests();
        app.handle_reply(Reply::Listing {
            seq: app.latest_listing,
            listing: Listing::Page(1),
            result: Ok(sample_payload(5, 12)),
        });
        assert!(app.notice.is_none());
        assert_eq!(app.list.questions.len(), 5);
    }

    #[test]
    fn test_created_notice_survives_its_own_reload() {
        let mut app = loaded_app(sample_payload(5, 12));
        app.handle_reply(Reply::Created { result: Ok(()) });
        app.take_requests();
        app.handle_reply(Reply::Listing {
            seq: app.latest_listing,
            listing: Listing::Page(1),
            result: Ok(sample_payload(5, 12)),
        });
        assert_eq!(app.notice.as_ref().unwrap().text, "题目已添加");
    }

    /// 把发件箱里的请求交给 worker，并把结果逐个合并回来
    fn round_trip(app: &mut App, worker: &FetchWorker) {
        let requests = app.take_requests();
        let count = requests.len();
        for request in requests {
            worker.submit(request);
        }
        for _ in 0..count {
            let reply = worker.recv().expect("worker reply");
            app.handle_reply(reply);
        }
    }

    #[test]
    fn test_backend_failures_through_worker() {
        let api = FakeApi::with_total(12);
        let worker = FetchWorker::spawn(api.clone());
        let mut app = App::new();
        app.mount();
        round_trip(&mut app, &worker);
        assert_eq!(app.list.questions.len(), 10);
        assert_eq!(app.list.total_questions, 12);
        let loaded = app.list.clone();

        api.fail_all();

        app.submit_search("Question");
        round_trip(&mut app, &worker);
        assert_eq!(app.list, loaded);
        assert_eq!(app.notice.as_ref().unwrap().level, NoticeLevel::Error);
        assert!(!app.loading);

        app.notice = None;
        app.dispatch(Action::Reload);
        round_trip(&mut app, &worker);
        assert_eq!(app.list, loaded);
        assert!(app.notice.is_none());

        assert_eq!(
            api.calls(),
            vec![
                "GET /questions?page=1".to_string(),
                "POST /questions/search Question".to_string(),
                "GET /questions?page=1".to_string(),
            ]
        );
        worker.shutdown();
    }
}
