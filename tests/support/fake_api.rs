//! In-process fake of the board service.
//!
//! Serves the subset of the REST surface the suite touches from a
//! `wiremock` server, keeping boards, lists and cards in memory so that
//! creates, renames and deletes are observable by later requests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use boardcheck::config::{AppConfig, Credentials};
use serde_json::{Value, json};
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// API key the fake accepts.
pub const FAKE_KEY: &str = "fake-key";

/// API token the fake accepts.
pub const FAKE_TOKEN: &str = "fake-token";

/// Lists every new board starts with.
const DEFAULT_LISTS: [&str; 3] = ["To Do", "Doing", "Done"];

struct FakeList {
    id: String,
    name: String,
}

struct FakeBoard {
    id: String,
    short_link: String,
    name: String,
    lists: Vec<FakeList>,
    cards_created: u64,
}

impl FakeBoard {
    fn matches(&self, id: &str) -> bool {
        self.id == id || self.short_link == id
    }

    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "closed": false,
            "shortLink": self.short_link,
            "shortUrl": format!("https://trello.com/b/{}", self.short_link),
        })
    }
}

struct FakeCard {
    id: String,
    id_short: u64,
    name: String,
    desc: String,
    list_id: String,
    board_id: String,
}

impl FakeCard {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "idShort": self.id_short,
            "name": self.name,
            "desc": self.desc,
            "idList": self.list_id,
            "idBoard": self.board_id,
        })
    }
}

#[derive(Default)]
struct FakeState {
    next_id: u64,
    boards: Vec<FakeBoard>,
    cards: Vec<FakeCard>,
    failing_deletes: bool,
    deletes: Vec<String>,
}

impl FakeState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn board(&self, id: &str) -> Option<&FakeBoard> {
        self.boards.iter().find(|b| b.matches(id))
    }

    fn board_mut(&mut self, id: &str) -> Option<&mut FakeBoard> {
        self.boards.iter_mut().find(|b| b.matches(id))
    }

    fn card_mut(&mut self, id: &str) -> Option<&mut FakeCard> {
        self.cards.iter_mut().find(|c| c.id == id)
    }

    fn board_for_list(&self, list_id: &str) -> Option<&FakeBoard> {
        self.boards
            .iter()
            .find(|b| b.lists.iter().any(|l| l.id == list_id))
    }
}

/// Stateful responder standing in for the board service.
#[derive(Clone)]
pub struct FakeBoardApi {
    state: Arc<Mutex<FakeState>>,
    key: String,
    token: String,
}

impl FakeBoardApi {
    /// Create an empty service accepting [`FAKE_KEY`] and [`FAKE_TOKEN`].
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState::default())),
            key: String::from(FAKE_KEY),
            token: String::from(FAKE_TOKEN),
        }
    }

    /// Start a mock server answering every request with this fake.
    pub async fn serve(&self) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(self.clone())
            .mount(&server)
            .await;
        server
    }

    /// Credentials pointing at `server` that the fake accepts.
    pub fn credentials(server: &MockServer) -> Result<Credentials, String> {
        Credentials::new(FAKE_KEY, FAKE_TOKEN, &format!("{}/1/", server.uri()))
            .map_err(|e| format!("fake credentials should resolve: {e}"))
    }

    /// Configuration pointing at `server` with the credentials the fake
    /// accepts.
    pub fn config(server: &MockServer) -> AppConfig {
        AppConfig {
            api_key: Some(String::from(FAKE_KEY)),
            api_token: Some(String::from(FAKE_TOKEN)),
            api_base_url: Some(format!("{}/1/", server.uri())),
            teardown_timeout_secs: 5,
            ..AppConfig::default()
        }
    }

    /// Make every `DELETE` answer 500 from now on.
    pub fn fail_deletes(&self) {
        self.lock().failing_deletes = true;
    }

    /// Number of boards currently stored.
    pub fn board_count(&self) -> usize {
        self.lock().boards.len()
    }

    /// Number of cards currently stored.
    pub fn card_count(&self) -> usize {
        self.lock().cards.len()
    }

    /// Whether a board with this id or short link exists.
    pub fn has_board(&self, id: &str) -> bool {
        self.lock().board(id).is_some()
    }

    /// Current name of a board.
    pub fn board_name(&self, id: &str) -> Option<String> {
        self.lock().board(id).map(|b| b.name.clone())
    }

    /// Paths of every `DELETE` received, in order.
    pub fn deletes(&self) -> Vec<String> {
        self.lock().deletes.clone()
    }

    /// Store a board directly, bypassing the API. Returns its short link.
    pub fn seed_board(&self, name: &str) -> String {
        let mut state = self.lock();
        let board = new_board(&mut state, name);
        let short_link = board.short_link.clone();
        state.boards.push(board);
        short_link
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn authorised(&self, request: &Request) -> bool {
        let mut key = None;
        let mut token = None;
        for (name, value) in request.url.query_pairs() {
            match name.as_ref() {
                "key" => key = Some(value.into_owned()),
                "token" => token = Some(value.into_owned()),
                _ => {}
            }
        }
        key.as_deref() == Some(self.key.as_str()) && token.as_deref() == Some(self.token.as_str())
    }
}

impl Default for FakeBoardApi {
    fn default() -> Self {
        Self::new()
    }
}

impl Respond for FakeBoardApi {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        if !self.authorised(request) {
            return ResponseTemplate::new(401).set_body_string("invalid key");
        }
        let path = request.url.path().trim_start_matches('/');
        let relative = path.strip_prefix("1/").unwrap_or(path);
        let segments: Vec<&str> = relative.split('/').filter(|s| !s.is_empty()).collect();
        let query = |name: &str| {
            request
                .url
                .query_pairs()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.into_owned())
        };
        let form = |name: &str| {
            url::form_urlencoded::parse(&request.body)
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.into_owned())
        };
        let field = |name: &str| form(name).or_else(|| query(name));

        let mut state = self.lock();
        if request.method.as_str() == "DELETE" {
            state.deletes.push(relative.to_owned());
            if state.failing_deletes {
                return ResponseTemplate::new(500).set_body_string("delete unavailable");
            }
        }

        match (request.method.as_str(), segments.as_slice()) {
            ("POST", ["boards"]) => match field("name") {
                Some(name) if !name.is_empty() => {
                    let board = new_board(&mut state, &name);
                    let body = board.to_json();
                    state.boards.push(board);
                    ok(body)
                }
                _ => bad_request("invalid value for name"),
            },
            ("GET", ["boards", id]) => state.board(id).map_or_else(not_found, |b| ok(b.to_json())),
            ("PUT", ["boards", id]) => {
                let name = field("name");
                state.board_mut(id).map_or_else(not_found, |b| {
                    if let Some(new_name) = name {
                        b.name = new_name;
                    }
                    ok(b.to_json())
                })
            }
            ("DELETE", ["boards", id]) => delete_board(&mut state, id),
            ("GET", ["boards", id, "lists"]) => state.board(id).map_or_else(not_found, |b| {
                ok(Value::Array(
                    b.lists
                        .iter()
                        .map(|l| json!({"id": l.id, "name": l.name, "idBoard": b.id}))
                        .collect(),
                ))
            }),
            ("GET", ["members", "me", "boards"]) => {
                ok(Value::Array(state.boards.iter().map(FakeBoard::to_json).collect()))
            }
            ("POST", ["cards"]) => create_card(&mut state, field("idList"), field("name")),
            ("GET", ["cards", id]) => state
                .cards
                .iter()
                .find(|c| c.id == *id)
                .map_or_else(not_found, |c| ok(c.to_json())),
            ("PUT", ["cards", id]) => {
                let name = field("name");
                let desc = field("desc");
                state.card_mut(id).map_or_else(not_found, |c| {
                    if let Some(new_name) = name {
                        c.name = new_name;
                    }
                    if let Some(new_desc) = desc {
                        c.desc = new_desc;
                    }
                    ok(c.to_json())
                })
            }
            ("DELETE", ["cards", id]) => {
                let before = state.cards.len();
                state.cards.retain(|c| c.id != *id);
                if state.cards.len() == before {
                    not_found()
                } else {
                    ok(json!({"limits": {}}))
                }
            }
            _ => not_found(),
        }
    }
}

fn new_board(state: &mut FakeState, name: &str) -> FakeBoard {
    let serial = state.next_id();
    let lists = DEFAULT_LISTS
        .iter()
        .map(|list_name| FakeList {
            id: format!("{:024x}", state.next_id()),
            name: (*list_name).to_owned(),
        })
        .collect();
    FakeBoard {
        id: format!("{serial:024x}"),
        short_link: format!("sl{serial:06x}"),
        name: name.to_owned(),
        lists,
        cards_created: 0,
    }
}

fn delete_board(state: &mut FakeState, id: &str) -> ResponseTemplate {
    let Some(board_id) = state.board(id).map(|b| b.id.clone()) else {
        return not_found();
    };
    state.boards.retain(|b| b.id != board_id);
    state.cards.retain(|c| c.board_id != board_id);
    ok(json!({"_value": null}))
}

fn create_card(state: &mut FakeState, list_id: Option<String>, name: Option<String>) -> ResponseTemplate {
    let Some(list) = list_id else {
        return bad_request("invalid value for idList");
    };
    let Some(board_id) = state.board_for_list(&list).map(|b| b.id.clone()) else {
        return bad_request("invalid value for idList");
    };
    let Some(board) = state.board_mut(&board_id) else {
        return bad_request("invalid value for idList");
    };
    board.cards_created += 1;
    let id_short = board.cards_created;
    let serial = state.next_id();
    let card = FakeCard {
        id: format!("{serial:024x}"),
        id_short,
        name: name.unwrap_or_default(),
        desc: String::new(),
        list_id: list,
        board_id,
    };
    let body = card.to_json();
    state.cards.push(card);
    ok(body)
}

fn ok(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

fn not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_string("The requested resource was not found.")
}

fn bad_request(message: &str) -> ResponseTemplate {
    ResponseTemplate::new(400).set_body_string(message)
}
