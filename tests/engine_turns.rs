//! 编排引擎整轮集成测试：Mock LLM + 内存协作方

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveDateTime};
    use tokio::sync::mpsc;

    use robin::engine::{AgentEvent, Engine, EngineOptions, SessionState};
    use robin::google::{
        AccountStatus, CalendarEvent, CalendarService, EmailMessage, MailService,
    };
    use robin::llm::MockLlmClient;

    struct StubAccount {
        connected: bool,
    }

    impl AccountStatus for StubAccount {
        fn is_connected(&self) -> bool {
            self.connected
        }
    }

    #[derive(Default)]
    struct StubMail {
        emails: Vec<EmailMessage>,
        search_calls: AtomicUsize,
        send_calls: AtomicUsize,
    }

    #[async_trait]
    impl MailService for StubMail {
        async fn search_messages(
            &self,
            _query: &str,
            _max_results: u32,
        ) -> Result<Vec<EmailMessage>, String> {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.emails.clone())
        }

        async fn send_message(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), String> {
            self.send_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    struct StubCalendar {
        events: Vec<CalendarEvent>,
        create_result: Option<Result<String, String>>,
    }

    #[async_trait]
    impl CalendarService for StubCalendar {
        async fn list_events(
            &self,
            _start: NaiveDateTime,
            _end: NaiveDateTime,
        ) -> Result<Vec<CalendarEvent>, String> {
            Ok(self.events.clone())
        }

        async fn create_event(
            &self,
            _title: &str,
            _start: &str,
            _end: &str,
            _description: &str,
            _location: &str,
        ) -> Result<String, String> {
            self.create_result
                .clone()
                .unwrap_or(Ok("created-id".to_string()))
        }
    }

    fn engine(
        llm: Arc<MockLlmClient>,
        mail: Arc<StubMail>,
        calendar: Arc<StubCalendar>,
        connected: bool,
    ) -> Engine {
        Engine::new(
            llm,
            mail,
            calendar,
            Arc::new(StubAccount { connected }),
            EngineOptions::default(),
        )
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
    }

    async fn run_turn(engine: &Engine, state: &mut SessionState, utterance: &str) -> Vec<AgentEvent> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        engine.process(state, utterance, today(), &tx).await;
        drop(tx);
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    fn texts(events: &[AgentEvent]) -> String {
        events
            .iter()
            .filter_map(|e| match e {
                AgentEvent::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    fn questions(events: &[AgentEvent]) -> Vec<&str> {
        events
            .iter()
            .filter_map(|e| match e {
                AgentEvent::Question(q) => Some(q.as_str()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn disconnected_turn_is_advisory_then_done() {
        let llm = Arc::new(MockLlmClient::new());
        let engine = engine(llm.clone(), Arc::default(), Arc::default(), false);
        let mut state = SessionState::new();

        let events = run_turn(&engine, &mut state, "when is my dentist appointment").await;

        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], AgentEvent::Text(t) if t.contains("connect")));
        assert_eq!(events[1], AgentEvent::Done);
        // 未规划：LLM 从未被调用
        assert!(llm.user_prompts().is_empty());
    }

    #[tokio::test]
    async fn empty_ready_plan_prompts_rephrase() {
        let llm = Arc::new(MockLlmClient::with_responses([
            r#"{"status": "ready", "plan": []}"#,
        ]));
        let engine = engine(llm, Arc::default(), Arc::default(), true);
        let mut state = SessionState::new();

        let events = run_turn(&engine, &mut state, "do the thing").await;

        assert!(matches!(&events[0], AgentEvent::Status(_)));
        assert!(texts(&events).contains("rephrase"));
        assert_eq!(events.last(), Some(&AgentEvent::Done));
        assert!(questions(&events).is_empty());
    }

    #[tokio::test]
    async fn planning_parse_error_is_reported_as_text() {
        let llm = Arc::new(MockLlmClient::with_responses(["certainly! here's my plan:"]));
        let engine = engine(llm, Arc::default(), Arc::default(), true);
        let mut state = SessionState::new();

        let events = run_turn(&engine, &mut state, "organize my inbox").await;

        assert!(texts(&events).contains("Failed to parse plan"));
        assert_eq!(events.last(), Some(&AgentEvent::Done));
    }

    #[tokio::test]
    async fn three_step_plan_runs_all_but_reports_first_failure() {
        let plan = r#"{
            "status": "ready",
            "plan": [
                {"tool": "search_emails", "params": {"query": "dentist"}, "purpose": "Find the reminder"},
                {"tool": "create_calendar_event",
                 "params": {"title": "Dentist", "date": "2026-08-08", "start_time": "15:00", "end_time": "16:00"},
                 "purpose": "Add the appointment"},
                {"tool": "search_emails", "params": {"query": "insurance"}, "purpose": "Find the insurance email"}
            ],
            "response_hint": ""
        }"#;
        let llm = Arc::new(MockLlmClient::with_responses([plan]));
        let mail = Arc::new(StubMail::default());
        let calendar = Arc::new(StubCalendar {
            create_result: Some(Err("calendar exploded".to_string())),
            ..Default::default()
        });
        let engine = engine(llm, mail.clone(), calendar, true);
        let mut state = SessionState::new();

        let events = run_turn(&engine, &mut state, "add my dentist appointment").await;

        // 三步全部尝试（步骤 3 在步骤 2 失败后仍执行）
        assert_eq!(mail.search_calls.load(Ordering::SeqCst), 2);
        // 但只报告第一个失败，且步骤 3 的结果不外露
        let text = texts(&events);
        assert_eq!(text, "❌ Error: calendar exploded");
        assert!(questions(&events).is_empty());
        assert_eq!(events.last(), Some(&AgentEvent::Done));
    }

    #[tokio::test]
    async fn clarification_round_trip_merges_short_answer() {
        let llm = Arc::new(MockLlmClient::with_responses([
            r#"{"status": "needs_clarification", "question": "How long is the appointment?"}"#,
            r#"{"status": "conversation", "response": "Noted!"}"#,
        ]));
        let engine = engine(llm.clone(), Arc::default(), Arc::default(), true);
        let mut state = SessionState::new();

        let events = run_turn(&engine, &mut state, "add dentist tomorrow at 3pm").await;
        assert_eq!(questions(&events), vec!["How long is the appointment?"]);
        assert_eq!(events.last(), Some(&AgentEvent::Done));
        assert!(state.has_pending());

        let events = run_turn(&engine, &mut state, "1 hour").await;
        assert_eq!(events.last(), Some(&AgentEvent::Done));
        assert!(!state.has_pending());

        let prompts = llm.user_prompts();
        assert_eq!(
            prompts[1],
            "add dentist tomorrow at 3pm\n\n(User was asked: 'How long is the appointment?' and answered: '1 hour')"
        );
    }

    #[tokio::test]
    async fn long_unrelated_followup_is_planned_as_fresh_request() {
        let llm = Arc::new(MockLlmClient::with_responses([
            r#"{"status": "needs_clarification", "question": "What time works for you?"}"#,
            r#"{"status": "conversation", "response": "Sure."}"#,
        ]));
        let engine = engine(llm.clone(), Arc::default(), Arc::default(), true);
        let mut state = SessionState::new();

        run_turn(&engine, &mut state, "schedule a meeting with the team").await;
        let fresh = "actually never mind that, please look through my inbox and tell me \
                     if the school has sent anything about the book fair this month";
        run_turn(&engine, &mut state, fresh).await;

        let prompts = llm.user_prompts();
        assert_eq!(prompts[1], fresh);
        assert!(!state.has_pending());
    }

    #[tokio::test]
    async fn mid_execution_clarification_repopulates_slot() {
        let plan = r#"{
            "status": "ready",
            "plan": [
                {"tool": "send_email",
                 "params": {"to": "Sarah", "subject": "Dinner", "body": "Come over at 6!"},
                 "purpose": "Invite Sarah"}
            ],
            "response_hint": ""
        }"#;
        let llm = Arc::new(MockLlmClient::with_responses([
            plan,
            r#"{"status": "conversation", "response": "Sent!"}"#,
        ]));
        let mail = Arc::new(StubMail::default());
        let engine = engine(llm.clone(), mail.clone(), Arc::default(), true);
        let mut state = SessionState::new();

        let events = run_turn(&engine, &mut state, "invite Sarah to dinner").await;

        // 校验门禁拦截，协作方未被调用
        assert_eq!(mail.send_calls.load(Ordering::SeqCst), 0);
        let asked = questions(&events);
        assert_eq!(asked.len(), 1);
        assert!(asked[0].contains("Sarah"));
        assert_eq!(events.last(), Some(&AgentEvent::Done));
        assert!(state.has_pending());

        // 下一轮给出地址：合并回原始请求
        run_turn(&engine, &mut state, "sarah@example.com").await;
        let prompts = llm.user_prompts();
        assert!(prompts[1].starts_with("invite Sarah to dinner\n\n(User was asked: '"));
        assert!(prompts[1].contains("and answered: 'sarah@example.com')"));
    }

    #[tokio::test]
    async fn dentist_lookup_streams_text_with_no_question() {
        let plan = r#"{
            "status": "ready",
            "plan": [
                {"tool": "list_calendar_events",
                 "params": {"range": "week", "filter": "dentist"},
                 "purpose": "Find the dentist appointment"}
            ],
            "response_hint": "Tell the user when the appointment is"
        }"#;
        let answer = "Your dentist appointment is Sat Aug 8 at 3:00 PM.";
        let llm = Arc::new(MockLlmClient::with_responses([plan, answer]));
        let calendar = Arc::new(StubCalendar {
            events: vec![CalendarEvent {
                id: "e1".to_string(),
                title: "Dentist appointment".to_string(),
                start: "2026-08-08T15:00:00-07:00".to_string(),
                end: "2026-08-08T16:00:00-07:00".to_string(),
                location: "12 Main St".to_string(),
                description: String::new(),
            }],
            ..Default::default()
        });
        let engine = engine(llm.clone(), Arc::default(), calendar, true);
        let mut state = SessionState::new();

        let events = run_turn(&engine, &mut state, "When's my dentist appointment?").await;

        assert!(questions(&events).is_empty());
        assert!(events.iter().any(|e| matches!(e, AgentEvent::Status(_))));
        assert_eq!(texts(&events), answer);
        assert_eq!(events.last(), Some(&AgentEvent::Done));
        assert!(!state.has_pending());

        // 合成调用拿到的是摘要而不是原始事件对象
        let prompts = llm.user_prompts();
        assert!(prompts[1].contains("Event: Dentist appointment"));
        assert!(prompts[1].contains("Hint: Tell the user when the appointment is"));
    }

    #[tokio::test]
    async fn conversation_turn_is_single_text() {
        let llm = Arc::new(MockLlmClient::with_responses([
            r#"{"status": "conversation", "response": "Hello! I can search mail and manage your calendar."}"#,
        ]));
        let engine = engine(llm, Arc::default(), Arc::default(), true);
        let mut state = SessionState::new();

        let events = run_turn(&engine, &mut state, "hi there").await;

        let text_events: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, AgentEvent::Text(_)))
            .collect();
        assert_eq!(text_events.len(), 1);
        assert_eq!(events.last(), Some(&AgentEvent::Done));
    }
}
