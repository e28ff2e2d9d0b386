//! `helix` - terminal front end for the Helix chat service

use helix_client::api::{ApiClient, HttpTransport, LoggingTransport};
use helix_client::chat::{ChatEngine, Role};
use helix_client::config::ClientConfig;
use helix_client::forms::{FormError, LoginForm, SignupForm};
use helix_client::navigation::{Navigator, Route, RouteNavigator};
use helix_client::session::{SessionState, SessionStore};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type HelixTransport = LoggingTransport<HttpTransport>;
type Store = SessionStore<HelixTransport, Arc<RouteNavigator>>;

const BACK_COMMAND: &str = "/back";
const LOGOUT_COMMAND: &str = "/logout";

struct Console {
    lines: Lines<BufReader<Stdin>>,
}

impl Console {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// `None` on end of input
    async fn prompt(&mut self, label: &str) -> std::io::Result<Option<String>> {
        print!("{label}");
        std::io::stdout().flush()?;
        self.lines.next_line().await
    }
}

struct App {
    api: Arc<ApiClient<HelixTransport>>,
    navigator: Arc<RouteNavigator>,
    store: Store,
    console: Console,
}

impl App {
    async fn run(&mut self) -> std::io::Result<()> {
        loop {
            let keep_going = match self.navigator.current() {
                Route::Landing => self.landing().await?,
                Route::Login => self.login().await?,
                Route::Signup => self.signup().await?,
                Route::Chat => self.chat().await?,
            };
            if !keep_going {
                return Ok(());
            }
        }
    }

    async fn landing(&mut self) -> std::io::Result<bool> {
        let snapshot = self.store.snapshot();
        let menu = match snapshot.user() {
            Some(user) => {
                println!("Signed in as {}", user.username);
                "[chat | quit] > "
            }
            None => "[login | signup | quit] > ",
        };
        if let Some(error) = &snapshot.error {
            println!("{error}");
        }

        let Some(choice) = self.console.prompt(menu).await? else {
            return Ok(false);
        };
        match choice.trim() {
            "login" => self.navigator.navigate(Route::Login),
            "signup" => self.navigator.navigate(Route::Signup),
            "chat" => self.navigator.navigate(Route::Chat),
            "quit" | "exit" => return Ok(false),
            "" => {}
            other => println!("Unknown command: {other}"),
        }
        Ok(true)
    }

    async fn login(&mut self) -> std::io::Result<bool> {
        println!("Log in ({BACK_COMMAND} to return)");
        let mut form = LoginForm::new();

        let Some(username) = self.field("Username: ").await? else {
            return Ok(self.leave_form());
        };
        form.set_username(username);
        let Some(password) = self.field("Password: ").await? else {
            return Ok(self.leave_form());
        };
        form.set_password(password);

        match form.submit(&self.store).await {
            Ok(user) => println!("Welcome back, {}!", user.username),
            Err(e) => report_form_error(&e),
        }
        Ok(true)
    }

    async fn signup(&mut self) -> std::io::Result<bool> {
        println!("Create an account ({BACK_COMMAND} to return)");
        let mut form = SignupForm::new();

        let Some(username) = self.field("Username: ").await? else {
            return Ok(self.leave_form());
        };
        form.set_username(username);
        let Some(email) = self.field("Email: ").await? else {
            return Ok(self.leave_form());
        };
        form.set_email(email);
        let Some(password) = self.field("Password: ").await? else {
            return Ok(self.leave_form());
        };
        form.set_password(password);

        match form.submit(&self.store).await {
            Ok(user) => println!("Welcome to Helix, {}!", user.username),
            Err(e) => report_form_error(&e),
        }
        Ok(true)
    }

    /// Read one form field; `None` when the user backs out or input ends
    async fn field(&mut self, label: &str) -> std::io::Result<Option<String>> {
        Ok(self
            .console
            .prompt(label)
            .await?
            .filter(|value| value.trim() != BACK_COMMAND))
    }

    fn leave_form(&self) -> bool {
        self.navigator.navigate(Route::Landing);
        true
    }

    async fn chat(&mut self) -> std::io::Result<bool> {
        if !self.store.snapshot().state.is_authenticated() {
            println!("Please log in to access this resource.");
            self.navigator.navigate(Route::Login);
            return Ok(true);
        }

        // Lives only while the chat view is shown
        let engine = Arc::new(ChatEngine::new(Arc::clone(&self.api)));
        println!("Chat with Helix ({LOGOUT_COMMAND} to sign out)");

        while self.navigator.current() == Route::Chat {
            let Some(line) = self.console.prompt("you> ").await? else {
                return Ok(false);
            };

            if line.trim() == LOGOUT_COMMAND {
                if let Err(e) = self.store.logout().await {
                    tracing::warn!(error = %e, "Logout did not complete on the server");
                }
                continue;
            }

            let seen = engine.snapshot().transcript.len();
            engine.set_input(line);
            let outcome = engine.submit();
            if engine.snapshot().is_awaiting() {
                println!("Thinking...");
            }
            outcome.settled().await;

            let snapshot = engine.snapshot();
            for turn in snapshot.transcript.turns().iter().skip(seen) {
                if turn.role == Role::Assistant {
                    println!("helix> {}", turn.content);
                }
            }
        }
        Ok(true)
    }
}

fn report_form_error(error: &FormError) {
    match error {
        FormError::Invalid(fields) => {
            for message in fields.messages() {
                println!("  {message}");
            }
        }
        other => println!("{other}"),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they stay out of the conversation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "helix_client=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ClientConfig::from_env()?;
    tracing::info!(
        base_url = %config.base_url,
        timeout = ?config.request_timeout,
        "Starting helix"
    );

    let transport = LoggingTransport::new(HttpTransport::new(&config)?);
    let api = Arc::new(ApiClient::new(transport));
    let navigator = Arc::new(RouteNavigator::new(Route::Landing));
    let store = SessionStore::new(Arc::clone(&api), Arc::clone(&navigator));

    println!("Welcome to Helix");
    if let SessionState::Authenticated { user } = store.recover().await? {
        tracing::info!(user_id = user.id, "Session restored");
    }

    let mut app = App {
        api,
        navigator,
        store,
        console: Console::new(),
    };
    app.run().await?;
    Ok(())
}
