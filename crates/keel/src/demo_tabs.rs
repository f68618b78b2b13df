//! Demo tabs over a pretend game server.
//!
//! Everything here is in-memory. The tabs exist to exercise every widget
//! kind from a real terminal.

use keel_core::{
    ButtonOption, CoreError, CoreResult, DropdownOption, Highlight, InputOption, Module, ModuleSet,
    RangeOption, Session, Tab,
};
use keel_ui::MODULES_TAB_ID;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub const SETTINGS_TAB_ID: &str = "settings";
pub const PLAYERS_TAB_ID: &str = "players";

const DIFFICULTIES: [&str; 4] = ["Peaceful", "Easy", "Normal", "Hard"];
const MAP_SIZES: [&str; 3] = ["Small", "Medium", "Large"];
const TIMES: [&str; 4] = ["Dawn", "Noon", "Dusk", "Midnight"];

/// Scratch key for a broadcast typed but not yet sent.
const DRAFT: &str = "settings.draft";
/// Scratch key for the player shown in column 1.
const SELECTED: &str = "players.selected";

#[derive(Debug, Clone)]
pub struct Player {
    pub name: String,
    pub muted: bool,
    pub admin: bool,
}

impl Player {
    fn new(name: &str, admin: bool) -> Self {
        Self {
            name: name.to_string(),
            muted: false,
            admin,
        }
    }
}

/// Server state the demo tabs read and mutate.
#[derive(Debug)]
pub struct ServerState {
    pub name: String,
    pub maintenance: bool,
    pub pvp: bool,
    pub difficulty: usize,
    pub map_size: usize,
    pub time_of_day: usize,
    pub volume: f32,
    pub players: Vec<Player>,
    pub broadcasts: Vec<String>,
}

impl Default for ServerState {
    fn default() -> Self {
        Self {
            name: "keel demo".to_string(),
            maintenance: false,
            pvp: true,
            difficulty: 2,
            map_size: 1,
            time_of_day: 1,
            volume: 50.0,
            players: vec![
                Player::new("ada", true),
                Player::new("brook", false),
                Player::new("cyd", false),
            ],
            broadcasts: Vec::new(),
        }
    }
}

pub type SharedState = Arc<Mutex<ServerState>>;

// ==================== Settings ====================

/// General and world settings, one of each widget kind.
pub fn settings_tab(state: &SharedState) -> Tab {
    let mut tab = Tab::new(SETTINGS_TAB_ID, "Settings");

    tab.add_name(0, "General");
    let (read, write) = (Arc::clone(state), Arc::clone(state));
    tab.add_input(
        0,
        InputOption::new("Server name")
            .placeholder(move || read.lock().name.clone())
            .on_submit(move |_, args| {
                let name = args.join(" ");
                if !name.is_empty() {
                    info!(name = %name, "renamed server");
                    write.lock().name = name;
                }
            })
            .char_limit(32),
    );

    let (read, write) = (Arc::clone(state), Arc::clone(state));
    tab.add_toggle(
        0,
        "Maintenance",
        move |_| {
            let mut state = write.lock();
            state.maintenance = !state.maintenance;
        },
        move |_| read.lock().maintenance,
    );

    let (read, write) = (Arc::clone(state), Arc::clone(state));
    tab.add_toggle(
        0,
        "PvP",
        move |_| {
            let mut state = write.lock();
            state.pvp = !state.pvp;
        },
        move |_| read.lock().pvp,
    );

    let (read, write) = (Arc::clone(state), Arc::clone(state));
    tab.add_enum(
        0,
        "Difficulty",
        move |_, backward| {
            let mut state = write.lock();
            let len = DIFFICULTIES.len();
            state.difficulty = if backward {
                (state.difficulty + len - 1) % len
            } else {
                (state.difficulty + 1) % len
            };
        },
        move || DIFFICULTIES[read.lock().difficulty % DIFFICULTIES.len()].to_string(),
    );

    tab.add_name(0, "Map size");
    let current = state.lock().map_size;
    for (index, label) in MAP_SIZES.iter().enumerate() {
        let write = Arc::clone(state);
        tab.add_radio(0, *label, "map_size", index == current, move |_, on| {
            if on {
                write.lock().map_size = index;
            }
        });
    }

    tab.add_name(1, "World");
    let (read, write) = (Arc::clone(state), Arc::clone(state));
    tab.add_dropdown(
        1,
        DropdownOption::new("Time of day", TIMES)
            .selected(move || read.lock().time_of_day)
            .on_select(move |_, index| write.lock().time_of_day = index),
    );

    let (value, text, write) = (Arc::clone(state), Arc::clone(state), Arc::clone(state));
    tab.add_range(
        1,
        RangeOption::new("Volume", 0.0, 100.0)
            .value(move || value.lock().volume)
            .text(move || format!("{:.0}%", text.lock().volume))
            .on_change(move |_, volume| write.lock().volume = volume),
    );

    let sent = Arc::clone(state);
    tab.add_input_button(
        1,
        "Broadcast",
        0.3,
        InputOption::new("message").on_submit(|ctx, args| {
            ctx.session.set(DRAFT, args.join(" "));
        }),
        ButtonOption::new("Send").on_press(move |ctx| {
            let draft: String = ctx.session.get(DRAFT);
            if !draft.is_empty() {
                info!(message = %draft, "broadcast");
                sent.lock().broadcasts.push(draft);
                ctx.session.clear(DRAFT);
            }
        }),
    );

    tab.add_button_array(
        1,
        vec![
            ButtonOption::new("Refresh").on_press(|ctx| ctx.redraw_after(Duration::from_secs(1))),
            ButtonOption::new("Close").on_press(|ctx| ctx.close_panel()),
            ButtonOption::new("Close in 3s")
                .highlight(|_| Highlight::Warned)
                .on_press(|ctx| ctx.close_after(Duration::from_secs(3))),
        ],
    );

    tab
}

// ==================== Players ====================

/// Roster in column 0, details of the pressed player in column 1.
pub fn players_tab(state: &SharedState) -> Tab {
    let mut tab = Tab::new(PLAYERS_TAB_ID, "Players").on_change(|tab, _| {
        tab.clear_column(1, false);
    });
    fill_roster(&mut tab, state);
    tab.add_column(1);
    tab
}

fn fill_roster(tab: &mut Tab, state: &SharedState) {
    tab.clear_column(0, false);
    tab.add_name(0, "Players");

    let players = state.lock().players.clone();
    for player in players {
        let shown = player.name.clone();
        let name = player.name.clone();
        let state = Arc::clone(state);
        tab.add_button(
            0,
            ButtonOption::new(player.name.as_str())
                .highlight(move |session: &Session| {
                    if session.get::<String>(SELECTED) == shown {
                        Highlight::Selected
                    } else {
                        Highlight::None
                    }
                })
                .on_press(move |ctx| {
                    ctx.session.set(SELECTED, name.clone());
                    show_player(ctx.tab, &state, &name);
                }),
        );
    }
}

fn show_player(tab: &mut Tab, state: &SharedState, name: &str) {
    tab.clear_column(1, false);
    tab.add_name(1, name);

    let admin = state
        .lock()
        .players
        .iter()
        .any(|p| p.name == name && p.admin);
    let role = if admin { "Admin" } else { "Player" };
    tab.add_read_only(1, "Role", move || role.to_string());

    let (read, write) = (Arc::clone(state), Arc::clone(state));
    let (read_name, write_name) = (name.to_string(), name.to_string());
    tab.add_toggle(
        1,
        "Muted",
        move |_| {
            if let Some(player) = write.lock().players.iter_mut().find(|p| p.name == write_name) {
                player.muted = !player.muted;
            }
        },
        move |_| {
            read.lock()
                .players
                .iter()
                .any(|p| p.name == read_name && p.muted)
        },
    );

    let kicked = Arc::clone(state);
    let kick_name = name.to_string();
    tab.add_button_array(
        1,
        vec![
            ButtonOption::new("Kick")
                .highlight(|_| Highlight::Important)
                .on_press(move |ctx| {
                    kicked.lock().players.retain(|p| p.name != kick_name);
                    info!(player = %kick_name, "kicked player");
                    ctx.session.clear(SELECTED);
                    ctx.tab.clear_column(1, false);
                    fill_roster(ctx.tab, &kicked);
                }),
            ButtonOption::new("Modules").on_press(|ctx| ctx.switch_to(MODULES_TAB_ID)),
        ],
    );
}

// ==================== Modules ====================

/// A module that only counts reloads.
#[derive(Debug)]
pub struct DemoModule {
    name: &'static str,
    description: &'static str,
    enabled: AtomicBool,
    reloads: AtomicU32,
    broken: bool,
}

impl DemoModule {
    pub fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            enabled: AtomicBool::new(true),
            reloads: AtomicU32::new(0),
            broken: false,
        }
    }

    /// A module whose reload always fails.
    pub fn broken(name: &'static str, description: &'static str) -> Self {
        Self {
            broken: true,
            ..Self::new(name, description)
        }
    }

    pub fn reloads(&self) -> u32 {
        self.reloads.load(Ordering::SeqCst)
    }
}

impl Module for DemoModule {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn reload(&self) -> CoreResult<()> {
        self.reloads.fetch_add(1, Ordering::SeqCst);
        if self.broken {
            return Err(CoreError::module(self.name, "no config to reload"));
        }
        Ok(())
    }
}

pub fn demo_modules() -> ModuleSet {
    let mut modules = ModuleSet::new();
    modules.add(Arc::new(DemoModule::new("vanish", "Hide admins from the player list")));
    modules.add(Arc::new(DemoModule::new("gather", "Resource gather multiplier")));
    modules.add(Arc::new(DemoModule::broken("kits", "Starter kits")));
    modules
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_core::Widget;
    use keel_ui::{call_action, LayoutConfig};

    fn shared() -> SharedState {
        Arc::new(Mutex::new(ServerState::default()))
    }

    fn press(tab: &mut Tab, session: &mut Session, column: usize, row: usize, args: &[&str]) {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        call_action(tab, session, column, row, &args, &LayoutConfig::default());
    }

    // ==================== Settings Tests ====================

    #[test]
    fn test_settings_layout() {
        let state = shared();
        let tab = settings_tab(&state);
        let kinds: Vec<&str> = tab.column(0).unwrap().iter().map(Widget::kind).collect();
        assert_eq!(
            kinds,
            ["name", "input", "toggle", "toggle", "enum", "name", "radio", "radio", "radio"]
        );
        assert_eq!(tab.radio_group("map_size").unwrap().selected(), Some(1));
    }

    #[test]
    fn test_settings_mutate_state() {
        let state = shared();
        let mut tab = settings_tab(&state);
        let mut session = Session::new(1);

        press(&mut tab, &mut session, 0, 1, &["new", "name"]);
        press(&mut tab, &mut session, 0, 2, &[]);
        press(&mut tab, &mut session, 0, 4, &["true"]);
        press(&mut tab, &mut session, 0, 8, &[]);

        let state = state.lock();
        assert_eq!(state.name, "new name");
        assert!(state.maintenance);
        assert_eq!(state.difficulty, 1);
        assert_eq!(state.map_size, 2);
    }

    #[test]
    fn test_broadcast_sends_draft() {
        let state = shared();
        let mut tab = settings_tab(&state);
        let mut session = Session::new(1);

        press(&mut tab, &mut session, 1, 3, &["input", "restart", "soon"]);
        press(&mut tab, &mut session, 1, 3, &["button"]);
        press(&mut tab, &mut session, 1, 3, &["button"]);

        assert_eq!(state.lock().broadcasts, vec!["restart soon".to_string()]);
    }

    // ==================== Players Tests ====================

    #[test]
    fn test_pressing_player_shows_details() {
        let state = shared();
        let mut tab = players_tab(&state);
        let mut session = Session::new(1);

        press(&mut tab, &mut session, 0, 2, &[]);
        assert_eq!(session.get::<String>(SELECTED), "brook");
        assert_eq!(tab.row(1, 0).map(Widget::label), Some("brook"));

        press(&mut tab, &mut session, 1, 2, &[]);
        assert!(state.lock().players[1].muted);
    }

    #[test]
    fn test_kick_rebuilds_roster() {
        let state = shared();
        let mut tab = players_tab(&state);
        let mut session = Session::new(1);

        press(&mut tab, &mut session, 0, 3, &[]);
        press(&mut tab, &mut session, 1, 3, &["0"]);

        assert_eq!(state.lock().players.len(), 2);
        assert_eq!(tab.column(0).unwrap().len(), 3);
        assert!(tab.column(1).unwrap().is_empty());
        assert!(!session.contains(SELECTED));
    }

    // ==================== Module Tests ====================

    #[test]
    fn test_demo_modules() {
        let modules = demo_modules();
        assert_eq!(modules.names(), ["vanish", "gather", "kits"]);
        assert!(matches!(
            modules.get("kits").unwrap().reload(),
            Err(CoreError::Module { .. })
        ));
        assert!(modules.get("vanish").unwrap().reload().is_ok());
    }

    #[test]
    fn test_demo_module_counts_reloads() {
        let module = DemoModule::new("x", "");
        module.reload().unwrap();
        module.set_enabled(false);
        assert_eq!(module.reloads(), 1);
        assert!(!module.is_enabled());
    }
}
