pub mod app;
pub mod event;
pub mod layout;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use crate::app::{AppContext, Result};
use crate::config::Config;
use crate::domain::FeedType;

use self::app::{ActivePane, TuiApp};
use self::event::{Action, AppEvent, EventHandler};

type Tui = Terminal<CrosstermBackend<Stdout>>;

pub async fn run(ctx: Arc<AppContext>, config: Arc<Config>, feed: FeedType) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, ctx, config, feed).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(
    terminal: &mut Tui,
    ctx: Arc<AppContext>,
    config: Arc<Config>,
    feed: FeedType,
) -> Result<()> {
    let mut tui_app = TuiApp::new(ctx.feed_controller(), ctx.tree_expander(), feed);
    let event_handler = EventHandler::new(Duration::from_millis(100));

    info!(feed = %feed, "Starting TUI");
    terminal.draw(|frame| layout::render(frame, &mut tui_app, &config.colors))?;
    tui_app.switch_feed(feed).await;

    loop {
        tui_app.tick();
        terminal.draw(|frame| layout::render(frame, &mut tui_app, &config.colors))?;

        match event_handler.next()? {
            AppEvent::Key(key) => {
                let action = config.keybindings.get_action(&key);
                match action {
                    Action::Quit => {
                        tui_app.should_quit = true;
                    }
                    Action::MoveUp => {
                        tui_app.move_up();
                    }
                    Action::MoveDown => {
                        tui_app.move_down();
                    }
                    Action::NextPage => {
                        tui_app.next_page();
                    }
                    Action::PrevPage => {
                        tui_app.prev_page();
                    }
                    Action::ToggleMaximize => {
                        tui_app.toggle_maximize();
                    }
                    Action::NextPane => {
                        tui_app.active_pane = tui_app.active_pane.next();
                    }
                    Action::PrevPane => {
                        tui_app.active_pane = tui_app.active_pane.prev();
                    }
                    Action::NextFeed => {
                        tui_app.next_feed().await;
                    }
                    Action::PrevFeed => {
                        tui_app.prev_feed().await;
                    }
                    Action::Select => {
                        if tui_app.active_pane == ActivePane::Stories {
                            tui_app.select();
                        }
                    }
                    Action::Back => {
                        tui_app.back();
                    }
                    Action::OpenInBrowser => {
                        if let Some(url) = tui_app.target_url() {
                            if let Err(e) = open::that(&url) {
                                warn!(url = %url, error = %e, "Failed to open browser");
                                tui_app.set_status(format!("Failed to open browser: {}", e));
                            }
                        }
                    }
                    Action::Refresh => {
                        tui_app.refresh().await;
                    }
                    Action::None => {}
                }
            }
            AppEvent::Tick => {}
        }

        if tui_app.should_quit {
            break;
        }
    }

    Ok(())
}
