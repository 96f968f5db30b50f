// Integration tests for the turn driver
use async_trait::async_trait;
use roundtable::agent::{AgentRegistry, ALEX, GINA, LUNA};
use roundtable::chat_provider::{ChatProvider, CompletionOptions, Message, ProviderError, Role};
use roundtable::clients::ProviderFactory;
use roundtable::config::{ConfigError, Credentials, DiscussionSettings};
use roundtable::discussion::{run_discussion, Discussion, EntryKind};
use roundtable::event::{DiscussionEvent, EventHandler};
use roundtable::search::{render_search_response, SearchBackend, SearchError, SearchProvider};
use std::sync::{Arc, Mutex};

type Script = Box<dyn Fn(&str, usize) -> Result<String, ProviderError> + Send + Sync>;

#[derive(Clone, Debug)]
struct Call {
    provider: String,
    model: String,
    messages: Vec<Message>,
    options: CompletionOptions,
}

type CallLog = Arc<Mutex<Vec<Call>>>;

// Mock provider answering from a script and recording every request
struct MockProvider {
    name: String,
    script: Script,
    log: CallLog,
    count: Mutex<usize>,
}

impl MockProvider {
    fn new(name: &str, log: CallLog, script: Script) -> Arc<Self> {
        Arc::new(MockProvider {
            name: name.to_string(),
            script,
            log,
            count: Mutex::new(0),
        })
    }

    fn echo(name: &str, log: CallLog) -> Arc<Self> {
        Self::new(
            name,
            log,
            Box::new(|model: &str, n: usize| Ok(format!("{} says #{}", model, n))),
        )
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    fn provider_name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        model: &str,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<String, ProviderError> {
        self.log.lock().unwrap().push(Call {
            provider: self.name.clone(),
            model: model.to_string(),
            messages: messages.to_vec(),
            options: *options,
        });
        let n = {
            let mut count = self.count.lock().unwrap();
            *count += 1;
            *count
        };
        (self.script)(model, n)
    }
}

struct MockSearch {
    result: Result<String, SearchError>,
    queries: Mutex<Vec<String>>,
}

impl MockSearch {
    fn new(result: Result<String, SearchError>) -> Arc<Self> {
        Arc::new(MockSearch {
            result,
            queries: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl SearchProvider for MockSearch {
    fn backend_name(&self) -> &str {
        "mock"
    }

    async fn search(&self, query: &str) -> Result<String, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.result.clone()
    }
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<DiscussionEvent>>,
}

#[async_trait]
impl EventHandler for Recorder {
    async fn on_discussion_event(&self, event: &DiscussionEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

fn echo_panel(log: &CallLog) -> AgentRegistry {
    AgentRegistry::default_panel(
        MockProvider::echo("openai", log.clone()),
        MockProvider::echo("groq", log.clone()),
    )
}

fn system_prompt(call: &Call) -> &str {
    &call.messages[0].content
}

#[tokio::test]
async fn every_turn_count_yields_three_ordered_entries_per_turn() {
    for turns in 1..=10 {
        let log = CallLog::default();
        let discussion = Discussion::new(echo_panel(&log), MockSearch::new(Ok("unused".into())));

        let outcome = discussion.run("Future of Quantum Computing", turns).await.unwrap();

        assert_eq!(outcome.turns.len(), turns);
        for (index, turn) in outcome.turns.iter().enumerate() {
            assert_eq!(turn.number, index + 1);
            let names: Vec<&str> = turn.entries.iter().map(|e| e.agent_name.as_str()).collect();
            assert_eq!(names, vec![ALEX, LUNA, GINA]);
        }
        assert_eq!(outcome.transcript.line_count(), 3 * turns + 1);
        assert_eq!(log.lock().unwrap().len(), 3 * turns);
    }
}

#[tokio::test]
async fn single_turn_queries_alex_luna_gina_in_order() {
    let log = CallLog::default();
    let discussion = Discussion::new(echo_panel(&log), MockSearch::new(Ok("unused".into())));

    let outcome = discussion.run("Ethics of Autonomous Vehicles", 1).await.unwrap();

    assert_eq!(outcome.topic, "Ethics of Autonomous Vehicles");
    assert_eq!(outcome.transcript.line_count(), 4);
    let speakers: Vec<&str> = outcome
        .transcript
        .entries()
        .iter()
        .map(|e| e.speaker.as_str())
        .collect();
    assert_eq!(speakers, vec![ALEX, LUNA, GINA]);

    let calls = log.lock().unwrap();
    let routed: Vec<(&str, &str)> = calls
        .iter()
        .map(|c| (c.provider.as_str(), c.model.as_str()))
        .collect();
    assert_eq!(
        routed,
        vec![
            ("openai", "gpt-3.5-turbo"),
            ("groq", "llama3-70b-8192"),
            ("openai", "gpt-4o"),
        ]
    );
}

#[tokio::test]
async fn requests_carry_fixed_template_and_sampling() {
    let log = CallLog::default();
    let discussion = Discussion::new(echo_panel(&log), MockSearch::new(Ok("unused".into())));
    discussion.run("Space Colonization: Mars vs. Moon", 1).await.unwrap();

    for call in log.lock().unwrap().iter() {
        assert_eq!(call.messages.len(), 2);
        assert_eq!(call.messages[0].role, Role::System);
        assert_eq!(call.messages[1].role, Role::User);
        assert_eq!(call.messages[1].content, "What do you think?");
        assert_eq!(call.options.max_tokens, 150);
        assert!((call.options.temperature - 0.7).abs() < f32::EPSILON);
        assert!(system_prompt(call).contains("Topic: 'Space Colonization: Mars vs. Moon'"));
        assert!(system_prompt(call).contains("Discussion Topic: Space Colonization: Mars vs. Moon"));
    }
}

#[tokio::test]
async fn later_agents_see_earlier_replies() {
    let log = CallLog::default();
    let discussion = Discussion::new(echo_panel(&log), MockSearch::new(Ok("unused".into())));
    let outcome = discussion.run("Cryptocurrency Regulation Challenges", 2).await.unwrap();

    let calls = log.lock().unwrap();
    let alex_first = &outcome.turns[0].entries[0].content;
    let gina_first = &outcome.turns[0].entries[2].content;

    // Alex opens with an empty history
    assert!(!system_prompt(&calls[0]).contains(&format!("{}: ", ALEX)));
    // Luna, same turn, already sees Alex
    assert!(system_prompt(&calls[1]).contains(&format!("{}: {}", ALEX, alex_first)));
    // Alex in turn two sees Gina's turn-one reply
    assert!(system_prompt(&calls[3]).contains(&format!("{}: {}", GINA, gina_first)));

    // The transcript is resent in full every time
    let last = system_prompt(&calls[5]);
    for entry in outcome.transcript.entries().iter().take(5) {
        assert!(last.contains(&entry.text));
    }
}

#[tokio::test]
async fn failing_agent_is_recorded_and_run_continues() {
    let log = CallLog::default();
    let failing_groq = MockProvider::new(
        "groq",
        log.clone(),
        Box::new(|_: &str, _: usize| {
            Err(ProviderError::Http {
                status: 503,
                body: "over capacity".into(),
            })
        }),
    );
    let panel = AgentRegistry::default_panel(MockProvider::echo("openai", log.clone()), failing_groq);
    let discussion = Discussion::new(panel, MockSearch::new(Ok("unused".into())));

    let outcome = discussion.run("AI's Impact on Creative Industries", 2).await.unwrap();

    assert_eq!(outcome.turns.len(), 2);
    for turn in &outcome.turns {
        let luna = &turn.entries[1];
        assert_eq!(luna.agent_name, LUNA);
        assert_eq!(luna.kind, EntryKind::Failed);
        assert_eq!(luna.content, "Error: HTTP 503: over capacity");
        assert_eq!(turn.entries[2].kind, EntryKind::Plain);
    }
    assert_eq!(outcome.failed_calls(), 2);
    assert_eq!(log.lock().unwrap().len(), 6);
    assert_eq!(outcome.transcript.line_count(), 7);
}

#[tokio::test]
async fn search_reply_is_folded_into_response() {
    let log = CallLog::default();
    let searching_openai = MockProvider::new(
        "openai",
        log.clone(),
        Box::new(|model: &str, _: usize| {
            if model == "gpt-3.5-turbo" {
                Ok("SEARCH: Nvidia AI market share\nThey dominate training hardware.".into())
            } else {
                Ok("Fair point.".into())
            }
        }),
    );
    let search = MockSearch::new(Ok("**[Nvidia](https://nvidia.com)**\n80% share\n\n".into()));
    let panel = AgentRegistry::default_panel(searching_openai, MockProvider::echo("groq", log.clone()));
    let discussion = Discussion::new(panel, search.clone());

    let outcome = discussion.run("Future of Quantum Computing", 1).await.unwrap();

    let alex = &outcome.turns[0].entries[0];
    assert_eq!(
        alex.kind,
        EntryKind::Searched {
            query: "Nvidia AI market share".into()
        }
    );
    assert!(alex.content.contains("searched"));
    assert!(alex.content.contains("Then said:"));
    assert_eq!(
        alex.content,
        render_search_response(
            ALEX,
            "Nvidia AI market share",
            "**[Nvidia](https://nvidia.com)**\n80% share\n\n",
            "They dominate training hardware."
        )
    );
    assert_eq!(*search.queries.lock().unwrap(), vec!["Nvidia AI market share"]);

    // Gina's plain reply passes through unchanged
    let gina = &outcome.turns[0].entries[2];
    assert_eq!(gina.content, "Fair point.");
    assert_eq!(gina.kind, EntryKind::Plain);

    // Luna reads the augmented text, not the raw sentinel
    let calls = log.lock().unwrap();
    assert!(system_prompt(&calls[1]).contains("Alex (GPT-3.5): Alex (GPT-3.5) searched 'Nvidia AI market share'"));
}

#[tokio::test]
async fn search_failure_is_inline() {
    let log = CallLog::default();
    let provider = MockProvider::new(
        "openai",
        log.clone(),
        Box::new(|_: &str, _: usize| Ok("SEARCH: quantum error correction".into())),
    );
    let search = MockSearch::new(Err(SearchError::Transport("offline".into())));
    let panel = AgentRegistry::default_panel(provider, MockProvider::echo("groq", log.clone()));
    let discussion = Discussion::new(panel, search);

    let outcome = discussion.run("Future of Quantum Computing", 1).await.unwrap();

    let alex = &outcome.turns[0].entries[0];
    assert_eq!(
        alex.content,
        "Alex (GPT-3.5) searched 'quantum error correction': Search failed: transport error: offline\nThen said: Interesting info!"
    );
    assert_eq!(outcome.failed_calls(), 0);
}

#[tokio::test]
async fn empty_query_fails_without_calling_search() {
    let log = CallLog::default();
    let provider = MockProvider::new("openai", log.clone(), Box::new(|_: &str, _: usize| Ok("SEARCH:".into())));
    let search = MockSearch::new(Ok("should not be used".into()));
    let panel = AgentRegistry::default_panel(provider, MockProvider::echo("groq", log.clone()));
    let discussion = Discussion::new(panel, search.clone());

    let outcome = discussion.run("Ethics of Autonomous Vehicles", 1).await.unwrap();

    let alex = &outcome.turns[0].entries[0];
    assert!(alex.content.contains("searched"));
    assert!(alex.content.contains("Search failed: empty query"));
    assert!(alex.content.contains("Then said:"));
    assert!(search.queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn events_follow_run_structure() {
    let log = CallLog::default();
    let recorder = Arc::new(Recorder::default());
    let discussion = Discussion::new(echo_panel(&log), MockSearch::new(Ok("unused".into())))
        .with_event_handler(recorder.clone());

    let outcome = discussion.run("Ethics of Autonomous Vehicles", 2).await.unwrap();
    let run_id = outcome.id.to_string();

    let events = recorder.events.lock().unwrap();
    // RunStarted + 2 × (TurnStarted + 3 × (Thinking + Responded) + TurnCompleted) + RunCompleted
    assert_eq!(events.len(), 1 + 2 * (1 + 3 * 2 + 1) + 1);
    assert_eq!(
        events[0],
        DiscussionEvent::RunStarted {
            run_id: run_id.clone(),
            topic: "Ethics of Autonomous Vehicles".into(),
            turns: 2,
            agent_count: 3,
        }
    );
    assert_eq!(
        events[1],
        DiscussionEvent::TurnStarted {
            run_id: run_id.clone(),
            turn: 1
        }
    );
    assert_eq!(
        events[2],
        DiscussionEvent::AgentThinking {
            run_id: run_id.clone(),
            turn: 1,
            agent_name: ALEX.into()
        }
    );
    assert!(matches!(
        &events[3],
        DiscussionEvent::AgentResponded { agent_name, searched: false, .. } if agent_name == ALEX
    ));
    assert_eq!(
        events.last().unwrap(),
        &DiscussionEvent::RunCompleted {
            run_id,
            turns: 2,
            failed_calls: 0
        }
    );
}

#[tokio::test]
async fn invalid_run_parameters_make_no_calls() {
    let log = CallLog::default();
    let discussion = Discussion::new(echo_panel(&log), MockSearch::new(Ok("unused".into())));

    assert_eq!(
        discussion.run("topic", 0).await.unwrap_err(),
        ConfigError::TurnsOutOfRange(0)
    );
    assert_eq!(
        discussion.run("topic", 11).await.unwrap_err(),
        ConfigError::TurnsOutOfRange(11)
    );
    assert_eq!(
        discussion.run("   ", 1).await.unwrap_err(),
        ConfigError::MissingTopic
    );
    assert!(log.lock().unwrap().is_empty());
}

// Factory counting how many remote handles were built
#[derive(Default)]
struct CountingFactory {
    constructed: Mutex<Vec<String>>,
    log: CallLog,
}

impl ProviderFactory for CountingFactory {
    fn openai(&self, secret_key: &str) -> Arc<dyn ChatProvider> {
        self.constructed.lock().unwrap().push(format!("openai:{}", secret_key));
        MockProvider::echo("openai", self.log.clone())
    }

    fn groq(&self, secret_key: &str) -> Arc<dyn ChatProvider> {
        self.constructed.lock().unwrap().push(format!("groq:{}", secret_key));
        MockProvider::echo("groq", self.log.clone())
    }

    fn search(&self, backend: SearchBackend, api_key: Option<&str>) -> Arc<dyn SearchProvider> {
        self.constructed
            .lock()
            .unwrap()
            .push(format!("search:{}:{}", backend, api_key.unwrap_or("-")));
        MockSearch::new(Ok("summary".into()))
    }
}

#[tokio::test]
async fn missing_credentials_prevent_any_remote_call() {
    let factory = CountingFactory::default();
    let settings = DiscussionSettings {
        topic: "Ethics of Autonomous Vehicles".into(),
        turns: 3,
        credentials: Credentials::new(Some("sk".into()), None, None),
        search_backend: SearchBackend::SerpApi,
    };

    let err = run_discussion(&settings, &factory, None).await.unwrap_err();

    assert_eq!(
        err,
        ConfigError::MissingCredentials(vec!["Groq API key", "SerpAPI key"])
    );
    assert!(factory.constructed.lock().unwrap().is_empty());
    assert!(factory.log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn valid_settings_build_panel_through_factory() {
    let factory = CountingFactory::default();
    let settings = DiscussionSettings {
        topic: "  Future of Quantum Computing ".into(),
        turns: 2,
        credentials: Credentials::new(Some("sk".into()), Some("gsk".into()), None),
        search_backend: SearchBackend::DuckDuckGo,
    };

    let outcome = run_discussion(&settings, &factory, None).await.unwrap();

    assert_eq!(outcome.topic, "Future of Quantum Computing");
    assert_eq!(outcome.turns.len(), 2);
    assert_eq!(
        *factory.constructed.lock().unwrap(),
        vec!["openai:sk", "groq:gsk", "search:duckduckgo:-"]
    );
    assert_eq!(factory.log.lock().unwrap().len(), 6);
}
