//! Builds the widget tree for each screen from the registry
//!
//! Widgets never call back into the registry directly. Their callbacks push
//! `MenuCommand`s onto a shared queue that the controller drains after input
//! routing, so no registry borrow is held while widgets run.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use ratatui::layout::{Position, Rect};
use rust_i18n::t;

use super::navigation::{DetailState, Screen};
use crate::model::{
    ModConfig, ModConfigManager, OptionDescriptor, OptionKind, OptionValue, OwnerId, PageEntry,
    PageId,
};
use crate::services::integration_log::IntegrationLog;
use crate::view::controls::slider::ValueFormatter;
use crate::view::controls::{
    Anchor, ButtonState, Callback, CheckboxState, DropdownState, Element, ElementBase,
    LabelState, LabelStyle, Numeric, SliderState, TextBoxState,
};
use crate::view::ui::RootElement;

/// First body row; above it sit the header and breadcrumb
pub const BODY_TOP: u16 = 3;
/// Rows kept free at the bottom for the footer buttons and the tooltip line
pub const FOOTER_HEIGHT: u16 = 3;
const LABEL_X: u16 = 2;
const MAX_LABEL_WIDTH: u16 = 32;

/// What a widget asks the controller to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuCommand {
    SelectOwner(OwnerId),
    OpenKeybindings,
    OpenPage(PageId),
    Back,
    Save,
    SaveAndClose,
    Reset,
    /// Open the capture popup for the keybind row at this child index
    EditKeybind(usize),
    KeybindFinished,
    /// The widget at this child index has a new pending value
    ValueChanged(usize),
}

pub type CommandQueue = Rc<RefCell<VecDeque<MenuCommand>>>;

/// Callback that queues `command`
pub fn send(commands: &CommandQueue, command: MenuCommand) -> Callback {
    let commands = commands.clone();
    Rc::new(move |_| commands.borrow_mut().push_back(command.clone()))
}

/// Scrolling region for a viewport, relative to the viewport
pub fn body_rect(viewport: Rect) -> Rect {
    Rect::new(
        0,
        BODY_TOP,
        viewport.width,
        viewport.height.saturating_sub(BODY_TOP + FOOTER_HEIGHT),
    )
}

/// Body row `offset` rows below `top`, saturating on huge pages
fn row_y(top: u16, offset: usize) -> u16 {
    top.saturating_add(u16::try_from(offset).unwrap_or(u16::MAX))
}

fn widget_x(viewport: Rect) -> u16 {
    LABEL_X + (viewport.width / 2).min(MAX_LABEL_WIDTH)
}

/// An option widget in a built screen
#[derive(Debug, Clone)]
pub struct OptionRow {
    /// Child index of the editing widget
    pub index: usize,
    pub owner: OwnerId,
    pub page: PageId,
    /// Entry index on the page
    pub entry: usize,
    pub option: Rc<OptionDescriptor>,
    /// Disabled while a save is loaded
    pub title_only: bool,
    /// The user edited the widget since the screen was built
    pub changed: bool,
}

#[derive(Debug, Default)]
pub struct BuiltScreen {
    pub root: RootElement,
    pub rows: Vec<OptionRow>,
}

impl BuiltScreen {
    pub fn row(&self, index: usize) -> Option<&OptionRow> {
        self.rows.iter().find(|r| r.index == index)
    }

    pub fn row_mut(&mut self, index: usize) -> Option<&mut OptionRow> {
        self.rows.iter_mut().find(|r| r.index == index)
    }

    /// Enable or disable title-screen-only rows for the live session state
    pub fn apply_session_state(&mut self, world_ready: bool) {
        for row in &self.rows {
            if let Some(child) = self.root.child_mut(row.index) {
                child.base_mut().enabled = !(row.title_only && world_ready);
            }
        }
    }
}

/// Everything a screen needs from its surroundings
pub struct ScreenContext<'a> {
    pub manager: &'a ModConfigManager,
    pub log: &'a IntegrationLog,
    pub commands: &'a CommandQueue,
    pub viewport: Rect,
    pub world_ready: bool,
}

pub fn build(screen: &Screen, ctx: &ScreenContext) -> BuiltScreen {
    let mut built = BuiltScreen {
        root: RootElement::new(ctx.viewport),
        rows: Vec::new(),
    };
    built.root.set_body(body_rect(ctx.viewport));
    match screen {
        Screen::List { .. } => build_list(&mut built, ctx),
        Screen::Detail(detail) => build_detail(&mut built, detail, ctx),
        Screen::Keybindings { .. } => build_keybindings(&mut built, ctx),
        // The capture popup is added on top of its parent by the controller
        Screen::KeybindEditor { parent, .. } => return build(parent, ctx),
    }
    built
}

fn scrolling(x: u16, y: u16) -> ElementBase {
    ElementBase {
        scrolls: true,
        ..ElementBase::at(x, y)
    }
}

fn header(built: &mut BuiltScreen, title: String, breadcrumb: Option<String>) {
    built.root.add_child(Element::Label(
        LabelState::new(title)
            .with_style(LabelStyle::Heading)
            .with_base(ElementBase::at(LABEL_X, 0)),
    ));
    if let Some(breadcrumb) = breadcrumb {
        built.root.add_child(Element::Label(
            LabelState::new(breadcrumb)
                .with_style(LabelStyle::Dim)
                .with_base(ElementBase::at(LABEL_X, 1)),
        ));
    }
}

fn footer(built: &mut BuiltScreen, commands: &CommandQueue, buttons: Vec<(String, MenuCommand)>) {
    let mut x = LABEL_X;
    for (label, command) in buttons {
        let button = ButtonState::new(label).with_base(ElementBase {
            anchor: Some(Anchor::bottom_left(x, 1)),
            callback: Some(send(commands, command)),
            ..ElementBase::default()
        });
        x = x.saturating_add(button.size().0 + 1);
        built.root.add_child(Element::Button(button));
    }
}

fn build_list(built: &mut BuiltScreen, ctx: &ScreenContext) {
    header(built, t!("menu.list_title").to_string(), None);

    if ctx.manager.iter().any(ModConfig::keybinds_editable) {
        built.root.add_child(Element::Button(
            ButtonState::new(t!("menu.edit_keybindings")).with_base(ElementBase {
                callback: Some(send(ctx.commands, MenuCommand::OpenKeybindings)),
                ..ElementBase::at(LABEL_X, 1)
            }),
        ));
    }

    if ctx.manager.is_empty() {
        built.root.add_child(Element::Label(
            LabelState::new(t!("menu.list_empty"))
                .with_style(LabelStyle::Dim)
                .with_base(scrolling(LABEL_X, BODY_TOP)),
        ));
    }

    for (row, config) in ctx.manager.iter().enumerate() {
        let locked = config.is_title_screen_only() && ctx.world_ready;
        let mut base = scrolling(LABEL_X, row_y(BODY_TOP, row));
        base.enabled = !locked;
        base.callback = Some(send(ctx.commands, MenuCommand::SelectOwner(config.id().clone())));
        base.tooltip = locked.then(|| t!("menu.title_screen_only").to_string());
        built.root.add_child(Element::Label(
            LabelState::new(config.owner.name.clone())
                .with_style(LabelStyle::Link)
                .with_base(base),
        ));
    }

    footer(built, ctx.commands, vec![(t!("menu.back").to_string(), MenuCommand::Back)]);
}

fn build_detail(built: &mut BuiltScreen, detail: &DetailState, ctx: &ScreenContext) {
    let Some(config) = ctx.manager.get(&detail.owner, false).ok().flatten() else {
        header(built, t!("menu.unavailable").to_string(), None);
        footer(built, ctx.commands, vec![(t!("menu.back").to_string(), MenuCommand::Back)]);
        return;
    };

    let separator = t!("menu.breadcrumb_separator").to_string();
    let breadcrumb = detail
        .path
        .iter()
        .filter_map(|id| config.page(id))
        .map(|page| page.display_name.get())
        .collect::<Vec<_>>()
        .join(&separator);
    let name = &config.owner.name;
    header(
        built,
        t!("menu.mod_options", name = name).to_string(),
        Some(breadcrumb),
    );

    let page_id = detail.current_page();
    let mut y = BODY_TOP;
    match config.page(page_id) {
        Some(page) if !page.entries.is_empty() => {
            for (entry_index, entry) in page.entries.iter().enumerate() {
                y = y.saturating_add(entry_rows(built, ctx, config, page_id, entry_index, entry, y));
            }
        }
        _ => {
            built.root.add_child(Element::Label(
                LabelState::new(t!("menu.no_options"))
                    .with_style(LabelStyle::Dim)
                    .with_base(scrolling(LABEL_X, y)),
            ));
        }
    }

    footer(
        built,
        ctx.commands,
        vec![
            (t!("menu.back").to_string(), MenuCommand::Back),
            (t!("menu.reset").to_string(), MenuCommand::Reset),
            (t!("menu.save").to_string(), MenuCommand::Save),
            (t!("menu.save_close").to_string(), MenuCommand::SaveAndClose),
        ],
    );
}

fn build_keybindings(built: &mut BuiltScreen, ctx: &ScreenContext) {
    header(built, t!("menu.keybindings_title").to_string(), None);

    let mut y = BODY_TOP;
    for config in ctx.manager.iter().filter(|c| c.keybinds_editable()) {
        if y > BODY_TOP {
            y = y.saturating_add(1);
        }
        built.root.add_child(Element::Label(
            LabelState::new(config.owner.name.clone())
                .with_style(LabelStyle::Heading)
                .with_base(scrolling(LABEL_X, y)),
        ));
        y = y.saturating_add(1);
        for page in config.pages() {
            for (entry_index, entry) in page.entries.iter().enumerate() {
                let is_keybind = entry
                    .option()
                    .is_some_and(|o| o.kind() == OptionKind::Keybinds);
                if is_keybind {
                    y = y.saturating_add(entry_rows(built, ctx, config, &page.id, entry_index, entry, y));
                }
            }
        }
    }

    footer(
        built,
        ctx.commands,
        vec![
            (t!("menu.back").to_string(), MenuCommand::Back),
            (t!("menu.save").to_string(), MenuCommand::Save),
            (t!("menu.save_close").to_string(), MenuCommand::SaveAndClose),
        ],
    );
}

/// Add the widgets for one page entry at row `y`; returns the rows used
fn entry_rows(
    built: &mut BuiltScreen,
    ctx: &ScreenContext,
    config: &ModConfig,
    page: &PageId,
    entry_index: usize,
    entry: &PageEntry,
    y: u16,
) -> u16 {
    let content_width = ctx.viewport.width.saturating_sub(LABEL_X * 2).max(1);
    match entry {
        PageEntry::SectionTitle { text, tooltip } => {
            let gap = u16::from(y > BODY_TOP);
            let mut base = scrolling(LABEL_X, y.saturating_add(gap));
            base.tooltip = tooltip.as_ref().map(|t| t.get()).filter(|t| !t.is_empty());
            built.root.add_child(Element::Label(
                LabelState::new(text.get())
                    .with_style(LabelStyle::Heading)
                    .with_base(base),
            ));
            gap + 1
        }
        PageEntry::Paragraph(text) => {
            let label = LabelState::new(text.get())
                .wrapped(content_width)
                .with_base(scrolling(LABEL_X, y));
            let height = label.size().1;
            built.root.add_child(Element::Label(label));
            height
        }
        PageEntry::PageLink {
            target,
            text,
            tooltip,
        } => {
            let mut base = scrolling(LABEL_X, y);
            base.callback = Some(send(ctx.commands, MenuCommand::OpenPage(target.clone())));
            base.tooltip = tooltip.as_ref().map(|t| t.get()).filter(|t| !t.is_empty());
            built.root.add_child(Element::Label(
                LabelState::new(text.get())
                    .with_style(LabelStyle::Link)
                    .with_base(base),
            ));
            1
        }
        PageEntry::Option(option) => option_row(built, ctx, config, page, entry_index, option, y),
    }
}

fn option_row(
    built: &mut BuiltScreen,
    ctx: &ScreenContext,
    config: &ModConfig,
    page: &PageId,
    entry_index: usize,
    option: &Rc<OptionDescriptor>,
    y: u16,
) -> u16 {
    let name = option.name();
    let tooltip = option.tooltip();
    let x = widget_x(ctx.viewport);

    let mut label_base = scrolling(LABEL_X, y);
    label_base.tooltip = tooltip.clone();
    built
        .root
        .add_child(Element::Label(LabelState::new(name.clone()).with_base(label_base)));

    if let Some(custom) = option.custom_widget() {
        built.root.add_child(Element::Label(
            LabelState::new("")
                .with_draw_hook(custom.height, custom.draw.clone())
                .with_base(scrolling(x, y)),
        ));
        return custom.height.max(1);
    }

    let title_only = option.is_title_screen_only() || config.is_title_screen_only();
    let index = built.root.len();
    let mut base = scrolling(x, y);
    base.tooltip = tooltip.clone();
    base.screen_reader_text = Some(name.clone());
    base.screen_reader_description = tooltip;

    let value = match option.read() {
        Ok(value) => value,
        Err(e) => return unavailable(built, ctx, config, base, &format_args!("option '{name}': {e}")),
    };
    if let OptionValue::Choice(current) = &value {
        let allowed = option.allowed_values();
        if allowed.is_empty() {
            let message = format!("option '{name}': has no choices");
            return unavailable(built, ctx, config, base, &message);
        }
        if !allowed.iter().any(|c| c == current) {
            let message = format!("option '{name}': value '{current}' is not one of its choices");
            return unavailable(built, ctx, config, base, &message);
        }
    }

    base.enabled = !(title_only && ctx.world_ready);
    base.callback = Some(match value.kind() {
        OptionKind::Keybinds => send(ctx.commands, MenuCommand::EditKeybind(index)),
        _ => send(ctx.commands, MenuCommand::ValueChanged(index)),
    });
    let element = widget_for(option, &value, base);
    built.root.add_child(element);
    built.rows.push(OptionRow {
        index,
        owner: config.id().clone(),
        page: page.clone(),
        entry: entry_index,
        option: option.clone(),
        title_only,
        changed: false,
    });
    1
}

/// Disabled placeholder for an option that cannot be edited; logged once
fn unavailable(
    built: &mut BuiltScreen,
    ctx: &ScreenContext,
    config: &ModConfig,
    mut base: ElementBase,
    message: &dyn std::fmt::Display,
) -> u16 {
    ctx.log.report_error(config.id(), message);
    base.enabled = false;
    built.root.add_child(Element::Label(
        LabelState::new(t!("menu.unavailable"))
            .with_style(LabelStyle::Dim)
            .with_base(base),
    ));
    1
}

/// The editing widget for an option's current value
pub fn widget_for(option: &Rc<OptionDescriptor>, value: &OptionValue, base: ElementBase) -> Element {
    let explicit = option.bounds().filter(|b| b.is_explicit());
    match value {
        OptionValue::Bool(checked) => Element::Checkbox(CheckboxState::new(*checked).with_base(base)),
        OptionValue::Int(_) | OptionValue::Float(_) if explicit.is_some() => {
            let (min, max) = explicit.map(|b| b.range_f64()).unwrap_or((0.0, 0.0));
            let numeric = match value {
                OptionValue::Int(_) => Numeric::Int,
                _ => Numeric::Float,
            };
            let formatter: ValueFormatter = {
                let option = option.clone();
                Rc::new(move |v| option.display_value(&numeric_value(numeric, v)))
            };
            Element::Slider(
                SliderState::new(value.as_f64().unwrap_or(min), min, max, numeric)
                    .with_interval(option.interval())
                    .with_formatter(Some(formatter))
                    .with_base(base),
            )
        }
        OptionValue::Int(v) => Element::TextBox(TextBoxState::new(v.to_string()).numeric(false).with_base(base)),
        OptionValue::Float(v) => Element::TextBox(TextBoxState::new(v.to_string()).numeric(true).with_base(base)),
        OptionValue::Text(v) => Element::TextBox(TextBoxState::new(v.clone()).with_base(base)),
        OptionValue::Choice(v) => {
            let dropdown = DropdownState::formatted(option.allowed_values().to_vec(), |c| {
                option.display_value(&OptionValue::Choice(c.to_string()))
            });
            Element::Dropdown(dropdown.with_value(v).with_base(base))
        }
        OptionValue::Keybinds(list) => {
            Element::Label(LabelState::new("").listening(list.clone()).with_base(base))
        }
    }
}

fn numeric_value(numeric: Numeric, v: f64) -> OptionValue {
    match numeric {
        Numeric::Int => OptionValue::Int(v.round() as i64),
        Numeric::Float => OptionValue::Float(v),
    }
}

/// The value a widget currently shows, in the option's kind. Keybind rows
/// and unparsable numbers give `None`.
pub fn pending_value(element: &Element, option: &OptionDescriptor) -> Option<OptionValue> {
    match (element, option.kind()) {
        (Element::Checkbox(s), OptionKind::Bool) => Some(OptionValue::Bool(s.checked)),
        (Element::Slider(s), OptionKind::Int | OptionKind::Float) => {
            Some(numeric_value(s.numeric, s.value))
        }
        (Element::TextBox(s), OptionKind::Int) => s.value.trim().parse().ok().map(OptionValue::Int),
        (Element::TextBox(s), OptionKind::Float) => {
            s.value.trim().parse().ok().map(OptionValue::Float)
        }
        (Element::TextBox(s), OptionKind::Text) => Some(OptionValue::Text(s.value.clone())),
        (Element::Dropdown(s), OptionKind::Choice) => {
            s.value().map(|v| OptionValue::Choice(v.to_string()))
        }
        _ => None,
    }
}

/// Centre of the viewport for a popup of `size`
pub fn centered(viewport: Rect, size: (u16, u16)) -> Position {
    Position::new(
        viewport.width.saturating_sub(size.0) / 2,
        viewport.height.saturating_sub(size.1) / 2,
    )
}
