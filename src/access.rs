use crate::list::ListState;
use crate::render::{self, Row};
use crate::screen::{Dispatcher, Generation, Lifecycle, Outcome, ScreenId};
use crate::types::AccessAttempt;
use log::warn;

/// The access log tab. Read-only; rows link to the detail screen by id.
pub struct AccessScreen {
    lifecycle: Lifecycle,
    list: ListState<AccessAttempt>,
}

impl AccessScreen {
    pub fn new(max_in_flight: usize) -> AccessScreen {
        AccessScreen {
            lifecycle: Lifecycle::new(max_in_flight),
            list: ListState::new(),
        }
    }

    pub fn id(&self) -> ScreenId {
        self.lifecycle.id()
    }

    pub fn list(&self) -> &ListState<AccessAttempt> {
        &self.list
    }

    pub fn focus(&mut self, dispatcher: &Dispatcher) {
        let generation = self.list.begin_fetch();
        let api = dispatcher.api().clone();
        dispatcher.fetch(&mut self.lifecycle, generation, async move {
            Outcome::AccessAttempts(api.access_attempts().await)
        });
    }

    pub fn apply(&mut self, generation: Generation, outcome: Outcome) {
        match outcome {
            Outcome::AccessAttempts(result) => {
                self.list.finish_fetch(generation, result);
            }
            other => warn!("Access screen ignoring unexpected outcome {:?}", other),
        }
    }

    pub fn render(&self) -> Vec<String> {
        render::table(
            "Access log",
            ["ID", "Plate", "Date", "Status"],
            &self.list,
            attempt_row,
        )
    }
}

fn attempt_row(attempt: &AccessAttempt) -> Row {
    [
        attempt.id.to_string(),
        render::or_placeholder(attempt.plate_text()),
        attempt.created_at.clone(),
        if attempt.status { "Authorized" } else { "Denied" }.to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::screen::Message;
    use serde_json::json;
    use tokio::sync::mpsc;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn rows_label_outcome() {
        let attempt = AccessAttempt {
            id: 12,
            plate: None,
            created_at: "05/02/2024 09:30:00".to_string(),
            status: false,
            original_image: "original_a.jpg".to_string(),
            result_image: "result_a.jpg".to_string(),
        };
        let row = attempt_row(&attempt);
        assert_eq!(row[1], "-");
        assert_eq!(row[3], "Denied");
    }

    #[tokio::test]
    async fn focus_fetches_and_renders_rows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/getAccess"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"ID": 1, "Plate": "AAA1111", "CreatedAt": "x", "Status": true},
                {"ID": 2, "Plate": "", "CreatedAt": "y", "Status": false}
            ])))
            .expect(1)
            .mount(&server)
            .await;
        let (tx, mut rx) = mpsc::channel(4);
        let api = ApiClient::new(Url::parse(&server.uri()).unwrap());
        let dispatcher = Dispatcher::new(api, tx, 2);

        let mut screen = AccessScreen::new(2);
        screen.focus(&dispatcher);
        assert!(screen.list().is_loading());

        match rx.recv().await {
            Some(Message::Completed(c)) => {
                assert_eq!(c.screen, screen.id());
                screen.apply(c.generation, c.outcome);
            }
            other => panic!("unexpected message: {:?}", other),
        }
        let lines = screen.render();
        assert_eq!(screen.list().items().len(), 2);
        assert!(lines.iter().any(|l| l.contains("Authorized")));
        assert!(lines.iter().any(|l| l.starts_with("2 ") && l.contains("Denied")));
        assert!(!lines.iter().any(|l| l == render::NO_RECORDS));
    }
}
