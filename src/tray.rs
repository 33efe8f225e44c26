//! macOS menubar host: tray title, dropdown menu, chime and notifications.

use std::error::Error;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;

use muda::MenuEvent;
use tray_icon::{TrayIcon, TrayIconBuilder};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

use crate::app::{lock, SharedApp};
use crate::audio::AudioPlayer;
use crate::display::format_tray_title;
use crate::event::{self, Command, EventResult};
use crate::focus::CompletionEvent;
use crate::menu::{self, MenuItems};
use crate::notifications;
use crate::timer::{self, TimerMessage};

/// Application handler for the winit event loop.
struct TrayHost {
    app: SharedApp,
    tray: Option<TrayIcon>,
    menu_items: MenuItems,
    timer_rx: Receiver<TimerMessage>,
    audio: Option<AudioPlayer>,
}

impl TrayHost {
    fn new(
        app: SharedApp,
        tray: TrayIcon,
        menu_items: MenuItems,
        timer_rx: Receiver<TimerMessage>,
    ) -> Self {
        // Audio is created on the main thread to avoid Send issues
        let audio = AudioPlayer::new()
            .inspect_err(|e| tracing::warn!("Audio unavailable: {}", e))
            .ok();

        Self {
            app,
            tray: Some(tray),
            menu_items,
            timer_rx,
            audio,
        }
    }

    /// Refreshes the dropdown and the tray title from the current state.
    fn refresh(&self) {
        let title = {
            let app = lock(&self.app);
            menu::update_menu_items(&self.menu_items, &app);
            format_tray_title(&app.timer)
        };
        self.update_tray_title(&title);
    }

    fn update_tray_title(&self, title: &str) {
        if let Some(ref tray) = self.tray {
            tray.set_title(Some(title));
        }
    }

    fn handle_completion(&self, event: CompletionEvent) {
        let settings = lock(&self.app).settings.clone();

        if settings.sound_enabled {
            if let Some(ref audio) = self.audio {
                audio.play_completion(event);
            }
        }

        if settings.notifications_enabled {
            notifications::notify_completion(event);
        }
    }

    fn process_timer_messages(&mut self) {
        // Process all pending timer messages
        while let Ok(msg) = self.timer_rx.try_recv() {
            match msg {
                TimerMessage::StateChanged { title } => {
                    self.update_tray_title(&title);
                    let app = lock(&self.app);
                    menu::update_menu_items(&self.menu_items, &app);
                }
                TimerMessage::Completed(event) => {
                    self.handle_completion(event);
                }
            }
        }
    }

    fn process_menu_events(&mut self, event_loop: &ActiveEventLoop) {
        while let Ok(menu_event) = MenuEvent::receiver().try_recv() {
            let Some(command) = Command::from_menu_id(menu_event.id().as_ref()) else {
                continue;
            };

            let result = {
                let mut app = lock(&self.app);
                event::handle_command(&mut app, command)
            };

            match result {
                EventResult::Quit => {
                    event_loop.exit();
                    return;
                }
                EventResult::StateChanged | EventResult::SettingsChanged => self.refresh(),
                EventResult::Continue => {}
            }
        }
    }
}

impl ApplicationHandler for TrayHost {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {
        // Nothing to do on resume for a tray-only app
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        _event: WindowEvent,
    ) {
        // No window events for a tray-only app
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Poll);

        // Process timer messages from the background thread
        self.process_timer_messages();

        self.process_menu_events(event_loop);
    }
}

/// Runs the menubar host until the user quits.
pub fn run(app: SharedApp) -> Result<(), Box<dyn Error>> {
    // Create event loop (required for tray on macOS)
    let event_loop = EventLoop::new()?;

    let (built_menu, menu_items, title) = {
        let app = lock(&app);
        let (built_menu, menu_items) = menu::build_menu(&app)?;
        (built_menu, menu_items, format_tray_title(&app.timer))
    };

    // No icon image, the title text carries the state
    let tray = TrayIconBuilder::new()
        .with_menu(Box::new(built_menu))
        .with_title(&title)
        .with_tooltip("Life Game Focus Timer")
        .build()?;

    let (tx, rx) = mpsc::channel();

    let ticker_app = Arc::clone(&app);
    thread::spawn(move || {
        timer::run_timer_loop(ticker_app, tx);
    });

    let mut host = TrayHost::new(app, tray, menu_items, rx);
    event_loop.run_app(&mut host)?;

    Ok(())
}
