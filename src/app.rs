use crate::access::AccessScreen;
use crate::api::ApiClient;
use crate::config::Config;
use crate::details::DetailsScreen;
use crate::newplate::{NewPlateScreen, Submission};
use crate::plates::PlatesScreen;
use crate::screen::{Completion, Dispatcher, Message};
use failure::Error;
use log::{debug, info};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, Sender};

const HELP: &str =
    "commands: plates | access | toggle <id> | new | open <id> | save | back | help | quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Plates,
    Access,
}

/// Screens pushed on top of the tabs.
enum Pushed {
    Details(DetailsScreen),
    NewPlate(NewPlateScreen),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

pub struct App {
    dispatcher: Dispatcher,
    max_in_flight: usize,
    image_dir: PathBuf,
    plates: PlatesScreen,
    access: AccessScreen,
    tab: Tab,
    stack: Vec<Pushed>,
    notices: Vec<String>,
}

impl App {
    pub fn new(config: &Config, tx: Sender<Message>) -> App {
        let api = ApiClient::new(config.api_url.clone());
        App {
            dispatcher: Dispatcher::new(api, tx, config.max_in_flight),
            max_in_flight: config.max_in_flight,
            image_dir: config.image_dir.clone(),
            plates: PlatesScreen::new(config.max_in_flight),
            access: AccessScreen::new(config.max_in_flight),
            tab: Tab::Plates,
            stack: Vec::new(),
            notices: Vec::new(),
        }
    }

    /// Shows the initial tab, which loads it.
    pub fn start(&mut self) {
        self.focus_tab();
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn plates(&self) -> &PlatesScreen {
        &self.plates
    }

    pub fn access(&self) -> &AccessScreen {
        &self.access
    }

    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    pub fn handle_line(&mut self, line: &str) -> Control {
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or("");
        let arg = words.next();

        match command {
            "quit" | "exit" => return Control::Quit,
            "help" => self.notices.push(HELP.to_string()),
            "back" => self.back(),
            _ => {
                if let Some(Pushed::NewPlate(form)) = self.stack.last_mut() {
                    if form.submit(&self.dispatcher, line) == Submission::Sent {
                        self.back();
                    }
                    return Control::Continue;
                }
                self.command(command, arg);
            }
        }
        Control::Continue
    }

    fn command(&mut self, command: &str, arg: Option<&str>) {
        let on_tab = self.stack.is_empty();
        match (command, on_tab, self.tab) {
            ("", _, _) => {}
            ("plates", true, _) => self.switch_tab(Tab::Plates),
            ("access", true, _) => self.switch_tab(Tab::Access),
            ("toggle", true, Tab::Plates) => match parse_id(arg) {
                Some(id) => {
                    if !self.plates.toggle_listed(&self.dispatcher, id) {
                        self.notices.push(format!("No plate with id {}", id));
                    }
                }
                None => self.notices.push("usage: toggle <id>".to_string()),
            },
            ("new", true, Tab::Plates) => self.stack.push(Pushed::NewPlate(NewPlateScreen::new())),
            ("open", true, Tab::Access) => match parse_id(arg) {
                Some(id) => {
                    let mut details = DetailsScreen::new(id, self.max_in_flight);
                    details.mount(&self.dispatcher);
                    self.stack.push(Pushed::Details(details));
                }
                None => self.notices.push("usage: open <id>".to_string()),
            },
            ("save", false, _) => {
                if let Some(Pushed::Details(details)) = self.stack.last_mut() {
                    if !details.save_images(&self.dispatcher, &self.image_dir) {
                        self.notices.push("No images to save yet".to_string());
                    }
                }
            }
            (other, _, _) => self
                .notices
                .push(format!("'{}' is not available here; {}", other, HELP)),
        }
    }

    fn switch_tab(&mut self, tab: Tab) {
        if self.tab != tab {
            self.tab = tab;
            self.focus_tab();
        }
    }

    fn focus_tab(&mut self) {
        info!("Focusing {:?} tab", self.tab);
        match self.tab {
            Tab::Plates => self.plates.focus(&self.dispatcher),
            Tab::Access => self.access.focus(&self.dispatcher),
        }
    }

    /// Pops the top screen. The tab underneath regains focus and refetches.
    fn back(&mut self) {
        match self.stack.pop() {
            Some(Pushed::Details(mut details)) => details.teardown(),
            Some(Pushed::NewPlate(_)) => {}
            None => {
                self.notices.push("Nothing to go back to".to_string());
                return;
            }
        }
        if self.stack.is_empty() {
            self.focus_tab();
        }
    }

    pub fn handle_message(&mut self, message: Message) {
        match message {
            Message::Notice(notice) => self.notices.push(notice),
            Message::Completed(completion) => self.route(completion),
        }
    }

    fn route(&mut self, completion: Completion) {
        let Completion {
            screen,
            generation,
            outcome,
        } = completion;
        if screen == self.plates.id() {
            return self.plates.apply(generation, outcome);
        }
        if screen == self.access.id() {
            return self.access.apply(generation, outcome);
        }
        for pushed in self.stack.iter_mut() {
            if let Pushed::Details(details) = pushed {
                if details.id() == screen {
                    return details.apply(generation, outcome);
                }
            }
        }
        debug!("No live screen {}; dropping completion", screen);
    }

    pub fn render(&self) -> Vec<String> {
        match self.stack.last() {
            Some(Pushed::Details(details)) => details.render(&self.dispatcher),
            Some(Pushed::NewPlate(form)) => form.render(),
            None => match self.tab {
                Tab::Plates => self.plates.render(),
                Tab::Access => self.access.render(),
            },
        }
    }
}

fn parse_id(arg: Option<&str>) -> Option<u64> {
    arg.and_then(|a| a.parse().ok())
}

fn print(app: &mut App) {
    for notice in app.take_notices() {
        println!("** {}", notice);
    }
    for line in app.render() {
        println!("{}", line);
    }
    println!();
}

/// Runs the terminal front end until `quit` or end of input.
pub async fn run(config: Config) -> Result<(), Error> {
    let (tx, mut rx) = mpsc::channel(64);
    let mut app = App::new(&config, tx);
    app.start();
    println!("{}", HELP);
    print(&mut app);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    if app.handle_line(&line) == Control::Quit {
                        break;
                    }
                }
                None => break,
            },
            Some(message) = rx.recv() => app.handle_message(message),
        }
        print(&mut app);
    }
    info!("Front end exiting");
    Ok(())
}
