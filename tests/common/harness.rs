//! Drives a `ConfigMenuApp` against an in-memory host and a ratatui test terminal

use std::rc::Rc;

use config_menu::api::Api;
use config_menu::config::MenuConfig;
use config_menu::input::{FrameInput, InputButton};
use config_menu::menu::InMemoryMenuStack;
use config_menu::services::persistence::MemoryStore;
use config_menu::ConfigMenuApp;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;

pub struct MenuTestHarness {
    pub app: ConfigMenuApp,
    pub host: InMemoryMenuStack,
    pub store: Rc<MemoryStore>,
    terminal: Terminal<TestBackend>,
}

impl MenuTestHarness {
    /// Harness with a world loaded and no host menu open
    pub fn new(width: u16, height: u16) -> anyhow::Result<Self> {
        Self::with_host(InMemoryMenuStack::in_session(Rect::new(0, 0, width, height)))
    }

    pub fn on_title_screen(width: u16, height: u16) -> anyhow::Result<Self> {
        Self::with_host(InMemoryMenuStack::on_title_screen(Rect::new(0, 0, width, height)))
    }

    /// In-session harness whose menu settings were saved before launch
    pub fn with_config(width: u16, height: u16, config: &MenuConfig) -> anyhow::Result<Self> {
        let store = Rc::new(MemoryStore::new());
        config.save(store.as_ref())?;
        Self::launch(InMemoryMenuStack::in_session(Rect::new(0, 0, width, height)), store)
    }

    fn with_host(host: InMemoryMenuStack) -> anyhow::Result<Self> {
        Self::launch(host, Rc::new(MemoryStore::new()))
    }

    fn launch(host: InMemoryMenuStack, store: Rc<MemoryStore>) -> anyhow::Result<Self> {
        super::tracing::init_tracing_from_env();
        let viewport = host.viewport;
        let mut app = ConfigMenuApp::new(store.clone());
        app.on_launched();
        Ok(Self {
            app,
            host,
            store,
            terminal: Terminal::new(TestBackend::new(viewport.width, viewport.height))?,
        })
    }

    pub fn api(&self) -> Api {
        self.app.api()
    }

    pub fn tick(&mut self) {
        self.app.on_update_ticking(&mut self.host, &FrameInput::default());
    }

    pub fn tick_frames(&mut self, frames: usize) {
        for _ in 0..frames {
            self.tick();
        }
    }

    /// One frame with the pointer resting at (x, y)
    pub fn hover(&mut self, x: u16, y: u16) {
        self.app.on_update_ticking(&mut self.host, &FrameInput::at(x, y));
    }

    pub fn send_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        let event = Event::Key(KeyEvent::new(code, modifiers));
        let consumed = self.app.on_input(&mut self.host, &event);
        self.tick();
        consumed
    }

    pub fn press_buttons(&mut self, pressed: &[InputButton]) -> bool {
        self.app.on_buttons_changed(&mut self.host, pressed)
    }

    pub fn click(&mut self, x: u16, y: u16) -> bool {
        let consumed = self.app.on_input(&mut self.host, &mouse(MouseEventKind::Down(MouseButton::Left), x, y));
        self.app.on_input(&mut self.host, &mouse(MouseEventKind::Up(MouseButton::Left), x, y));
        self.tick();
        consumed
    }

    /// Render, find `text` on screen and click its first cell
    pub fn click_text(&mut self, text: &str) -> anyhow::Result<bool> {
        self.render()?;
        let (x, y) = self
            .find_text(text)
            .ok_or_else(|| anyhow::anyhow!("{text:?} not on screen:\n{}", self.screen_to_string()))?;
        Ok(self.click(x, y))
    }

    pub fn scroll_down(&mut self, notches: usize) {
        let viewport = self.host.viewport;
        let event = mouse(MouseEventKind::ScrollDown, viewport.width / 2, viewport.height / 2);
        for _ in 0..notches {
            self.app.on_input(&mut self.host, &event);
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) -> anyhow::Result<()> {
        let viewport = Rect::new(0, 0, width, height);
        self.host.viewport = viewport;
        self.terminal.backend_mut().resize(width, height);
        self.terminal.resize(viewport)?;
        self.app.on_window_resized(viewport);
        Ok(())
    }

    pub fn render(&mut self) -> anyhow::Result<()> {
        let (app, host) = (&self.app, &self.host);
        self.terminal.draw(|frame| app.on_rendered(host, frame))?;
        Ok(())
    }

    pub fn screen_to_string(&self) -> String {
        let buffer = self.terminal.backend().buffer();
        let mut screen = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                screen.push_str(buffer[(x, y)].symbol());
            }
            screen.push('\n');
        }
        screen
    }

    /// Top-left cell of the first occurrence of `text`
    pub fn find_text(&self, text: &str) -> Option<(u16, u16)> {
        self.screen_to_string()
            .lines()
            .enumerate()
            .find_map(|(y, line)| {
                let byte = line.find(text)?;
                let x = line[..byte].chars().count();
                Some((x as u16, y as u16))
            })
    }

    pub fn assert_screen_contains(&self, text: &str) {
        let screen = self.screen_to_string();
        assert!(screen.contains(text), "expected {text:?} on screen:\n{screen}");
    }

    pub fn assert_screen_not_contains(&self, text: &str) {
        let screen = self.screen_to_string();
        assert!(!screen.contains(text), "did not expect {text:?} on screen:\n{screen}");
    }
}

fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
    Event::Mouse(MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    })
}
