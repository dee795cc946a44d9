//! Course homework: answer checking, evaluation reports, course setup.
//!
//! Every request is a POST carrying a `mode` and a JSON-encoded `params`
//! string. The endpoint comes from [`ConsoleConfig::homework_endpoint`]
//! because older hosts mount it at `/hw/`.
//!
//! [`ConsoleConfig::homework_endpoint`]: crate::config::ConsoleConfig

use std::sync::Arc;

use serde_json::{json, Map, Value};

use super::{OpResult, Operation};
use crate::channel::Params;
use crate::context::ConsoleContext;
use crate::envelope::{data_text, Outcome};

const HOMEWORK: Operation = Operation::post("/jboxplugin/hw/", "processing homework");

/// Presentation of one homework mode.
struct View {
    title: &'static str,
    failure: &'static str,
}

const EVALUATION: View = View {
    title: "Evaluation",
    failure: "verifying answer",
};
const EVALUATIONS: View = View {
    title: "Evaluations",
    failure: "retrieving evaluations",
};
const ANSWERS: View = View {
    title: "Answers",
    failure: "retrieving answers",
};
const CREATE_COURSE: View = View {
    title: "Create Course",
    failure: "creating course",
};

fn unexpected(action: &str) -> String {
    format!(
        "Oops. Unexpected error while {}.\n\nPlease try again later.",
        action
    )
}

pub struct HomeworkPlugin {
    ctx: Arc<ConsoleContext>,
}

impl HomeworkPlugin {
    pub fn new(ctx: Arc<ConsoleContext>) -> Self {
        Self { ctx }
    }

    /// Evaluate an answer. With `record` the attempt is stored as a
    /// submission, otherwise it is only checked.
    pub async fn check(
        &self,
        course: &str,
        problemset: &str,
        question: &str,
        answer: &str,
        record: bool,
    ) -> OpResult {
        let mode = if record { "submit" } else { "check" };
        let params = json!({
            "course": course,
            "problemset": problemset,
            "question": question,
            "answer": answer,
        });
        self.send(mode, &params, &EVALUATION).await
    }

    /// Evaluations of every student.
    pub async fn report(
        &self,
        course: &str,
        problemset: &str,
        questions: Option<Value>,
    ) -> OpResult {
        self.send("report", &scoped(course, problemset, questions), &EVALUATIONS)
            .await
    }

    /// The caller's own evaluations.
    pub async fn myreport(
        &self,
        course: &str,
        problemset: &str,
        questions: Option<Value>,
    ) -> OpResult {
        self.send("myreport", &scoped(course, problemset, questions), &EVALUATIONS)
            .await
    }

    /// Reference answers.
    pub async fn metadata(
        &self,
        course: &str,
        problemset: &str,
        questions: Option<Value>,
    ) -> OpResult {
        self.send("metadata", &scoped(course, problemset, questions), &ANSWERS)
            .await
    }

    /// Register a course from its full description.
    pub async fn create(&self, course: &Value) -> OpResult {
        self.send("create", course, &CREATE_COURSE).await
    }

    async fn send(&self, mode: &str, params: &Value, view: &View) -> OpResult {
        let renderer = self.ctx.renderer();
        let endpoint = self.ctx.config().homework_endpoint.as_str();
        let params = Params::new()
            .with("mode", mode)
            .with("params", params.to_string());

        match HOMEWORK.run_at(&self.ctx, endpoint, params).await {
            Ok(outcome) => {
                match &outcome {
                    Outcome::Ok(data) => renderer.table(view.title, data.clone()).await,
                    Outcome::Error(reason) => {
                        renderer
                            .preformatted("", reason.clone().unwrap_or_default())
                            .await
                    }
                    Outcome::Warning(_) | Outcome::NoData => {}
                }
                Ok(outcome)
            }
            Err(err) => {
                tracing::warn!(mode, error = %err, "homework request failed");
                renderer.ui().alert(&unexpected(view.failure)).await;
                Err(err)
            }
        }
    }
}

/// `{course, problemset[, questions]}`; `questions` is left out when empty.
fn scoped(course: &str, problemset: &str, questions: Option<Value>) -> Value {
    let mut params = Map::new();
    params.insert("course".to_string(), Value::from(course));
    params.insert("problemset".to_string(), Value::from(problemset));
    if let Some(questions) = questions.filter(|q| data_text(q).is_some()) {
        params.insert("questions".to_string(), questions);
    }
    Value::Object(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockResponse;
    use crate::plugins::testing::Harness;
    use crate::traits::DialogContent;

    fn url() -> String {
        Harness::url("/jboxplugin/hw/")
    }

    fn sent_params(harness: &Harness) -> Value {
        let request = &harness.http.get_requests()[0];
        serde_json::from_str(&request.param("params").unwrap()).unwrap()
    }

    #[test]
    fn test_scoped_drops_empty_questions() {
        assert_eq!(
            scoped("c", "p", None),
            json!({"course": "c", "problemset": "p"})
        );
        assert_eq!(
            scoped("c", "p", Some(json!(""))),
            json!({"course": "c", "problemset": "p"})
        );
        assert_eq!(
            scoped("c", "p", Some(json!(["q1", "q2"]))),
            json!({"course": "c", "problemset": "p", "questions": ["q1", "q2"]})
        );
    }

    #[tokio::test]
    async fn test_check_and_submit_modes() {
        let harness = Harness::new();
        harness
            .http
            .set_response(&url(), MockResponse::envelope(0, json!({"score": 1})));
        let plugin = HomeworkPlugin::new(harness.ctx.clone());

        plugin.check("c1", "ps1", "q1", "42", false).await.unwrap();
        plugin.check("c1", "ps1", "q1", "42", true).await.unwrap();

        let requests = harness.http.get_requests();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].param("mode").as_deref(), Some("check"));
        assert_eq!(requests[1].param("mode").as_deref(), Some("submit"));
        assert_eq!(
            sent_params(&harness),
            json!({"course": "c1", "problemset": "ps1", "question": "q1", "answer": "42"})
        );

        let dialogs = harness.ui.dialogs();
        assert_eq!(dialogs.len(), 2);
        assert_eq!(dialogs[0].0, "Evaluation");
        assert_eq!(dialogs[0].1, DialogContent::Table(json!({"score": 1})));
    }

    #[tokio::test]
    async fn test_failure_shows_preformatted_data() {
        let harness = Harness::new();
        harness
            .http
            .set_response(&url(), MockResponse::envelope(1, json!("course not found")));
        let plugin = HomeworkPlugin::new(harness.ctx.clone());

        let outcome = plugin.report("c1", "ps1", None).await.unwrap();
        assert!(outcome.is_error());
        assert_eq!(
            harness.ui.dialogs(),
            vec![(
                String::new(),
                DialogContent::Preformatted("course not found".to_string())
            )]
        );
    }

    #[tokio::test]
    async fn test_transport_failure_wording() {
        let harness = Harness::new();
        harness.http.set_response(&url(), MockResponse::status(500));
        let plugin = HomeworkPlugin::new(harness.ctx.clone());

        assert!(plugin.metadata("c", "p", None).await.is_err());
        assert!(plugin.create(&json!({"id": "c"})).await.is_err());
        assert_eq!(
            harness.ui.alerts(),
            vec![
                "Oops. Unexpected error while retrieving answers.\n\nPlease try again later.",
                "Oops. Unexpected error while creating course.\n\nPlease try again later.",
            ]
        );
    }

    #[tokio::test]
    async fn test_create_sends_course_verbatim() {
        let harness = Harness::new();
        harness
            .http
            .set_response(&url(), MockResponse::envelope(0, json!({"created": true})));
        let plugin = HomeworkPlugin::new(harness.ctx.clone());
        let course = json!({"id": "c1", "problemsets": [{"id": "ps1"}]});

        plugin.create(&course).await.unwrap();
        assert_eq!(sent_params(&harness), course);
        assert_eq!(harness.ui.dialogs()[0].0, "Create Course");
    }

    #[tokio::test]
    async fn test_legacy_endpoint_from_config() {
        use crate::adapters::mock::{MockHttpClient, RecordingSurface};
        use crate::channel::CommandChannel;
        use crate::config::ConsoleConfig;
        use crate::context::ConsoleContext;
        use crate::session::CookieJar;

        let http = MockHttpClient::new();
        http.set_response("http://mock/hw/", MockResponse::envelope(0, json!([])));
        let config = ConsoleConfig::default()
            .with_base_url("http://mock")
            .with_cookie_path(None)
            .with_homework_endpoint("/hw/");
        let channel = CommandChannel::new(
            Arc::new(http.clone()),
            config,
            Arc::new(CookieJar::in_memory()),
        );
        let ctx = ConsoleContext::new(channel, Arc::new(RecordingSurface::new()));

        HomeworkPlugin::new(ctx)
            .myreport("c", "p", Some(json!(["q1"])))
            .await
            .unwrap();
        assert_eq!(http.get_requests()[0].url, "http://mock/hw/");
    }
}
