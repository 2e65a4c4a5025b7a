use crate::storage::{self, TabStorage};
use exponentile_core as game;
use game::{GameHistoryEntry, HistorySort, SortKey, SortOrder, TileValue};
use yew::prelude::*;

/// Tile colours of the first values, larger values walk around the hue circle.
const TILE_COLORS: [&str; 9] = [
    "#0a9396", "#e9d8a6", "#ee9b00", "#ca6702", "#005f73", "#ae2012", "#86350f", "#94d2bd",
    "#9b2226",
];

pub(crate) fn tile_color(value: TileValue) -> String {
    match value {
        0 => "transparent".to_string(),
        1..=9 => TILE_COLORS[value as usize - 1].to_string(),
        _ => format!("hsl({} 100% 75%)", (value - 9) * 36 % 360),
    }
}

#[derive(Properties, Clone, PartialEq)]
struct MiniBoardProps {
    board: Vec<TileValue>,
}

#[function_component(MiniBoard)]
fn mini_board(props: &MiniBoardProps) -> Html {
    let grid = game::board_grid(&props.board);
    html! {
        <table class="mini-board">
            {
                for grid.rows().into_iter().map(|row| html! {
                    <tr>
                        {
                            for row.iter().map(|&value| {
                                let style = format!("background-color: {}", tile_color(value));
                                html! {
                                    <td {style}>{if value > 0 { value.to_string() } else { String::new() }}</td>
                                }
                            })
                        }
                    </tr>
                })
            }
        </table>
    }
}

#[derive(Properties, Clone, PartialEq)]
struct SortButtonProps {
    column: SortKey,
    order: Option<SortOrder>,
    callback: Callback<SortKey>,
}

#[function_component(SortButton)]
fn sort_button(props: &SortButtonProps) -> Html {
    let SortButtonProps {
        column,
        order,
        callback,
    } = props.clone();
    let indicator = match order {
        Some(SortOrder::Asc) => "▲",
        Some(SortOrder::Desc) => "▼",
        None => "",
    };
    let onclick = Callback::from(move |_: MouseEvent| callback.emit(column));
    html! {
        <button class="sort" {onclick}>{column.label()}{indicator}</button>
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    Sort(SortKey),
    Load(GameHistoryEntry),
}

#[derive(Properties, Clone, PartialEq)]
pub(crate) struct HistoryProps {
    /// Where the play page lives, relative to the history page.
    pub play_path: AttrValue,
}

pub(crate) struct HistoryView {
    history: Vec<GameHistoryEntry>,
    sort: HistorySort,
}

impl HistoryView {
    fn load_game(&self, ctx: &Context<Self>, entry: &GameHistoryEntry) {
        let loaded = game::LoadedGame::from_entry(entry);
        if let Err(err) = loaded.write_to(&TabStorage) {
            log::error!("Could not hand the game over to the play page: {}", err);
            return;
        }

        let play_path = &ctx.props().play_path;
        log::debug!("loading game with seed {} at {}", entry.seed, play_path);
        if let Err(err) = gloo::utils::window().location().set_href(play_path) {
            log::error!("Could not navigate to {}: {:?}", play_path, err);
        }
    }

    fn view_row(&self, ctx: &Context<Self>, entry: GameHistoryEntry) -> Html {
        let duration = game::format_duration(entry.start_time, entry.stop_time);
        let onclick = {
            let entry = entry.clone();
            ctx.link().callback(move |_: MouseEvent| Msg::Load(entry.clone()))
        };
        html! {
            <tr>
                <td>{game::format_timestamp(entry.start_time)}</td>
                <td>{game::format_timestamp(entry.stop_time)}</td>
                <td>{duration}</td>
                <td class="score">{game::format_count(entry.score)}</td>
                <td>{game::format_count(entry.moves.into())}</td>
                <td class="seed">{entry.seed.to_string()}</td>
                <td>
                    <button class="load" title="Load this game" {onclick}>
                        <MiniBoard board={entry.board}/>
                    </button>
                </td>
            </tr>
        }
    }
}

impl Component for HistoryView {
    type Message = Msg;
    type Properties = HistoryProps;

    fn create(_ctx: &Context<Self>) -> Self {
        let history = storage::persisted().history();
        log::debug!("history: {} games", history.len());
        Self {
            history,
            sort: HistorySort::default(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Sort(key) => {
                self.sort.toggle(key);
                log::debug!("sort: {:?}", self.sort);
                true
            }
            Msg::Load(entry) => {
                self.load_game(ctx, &entry);
                false
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let cb_sort = ctx.link().callback(Msg::Sort);
        let header = |column: SortKey| {
            let order = self.sort.order_for(column);
            let callback = cb_sort.clone();
            html! {
                <th><SortButton {column} {order} {callback}/></th>
            }
        };
        let rows = game::sorted(self.history.clone(), self.sort);

        html! {
            <div class="history">
                <header>
                    <a href="..">{"←"}</a>
                    <h1>{"Game History"}</h1>
                </header>
                <table>
                    <thead>
                        <tr>
                            {header(SortKey::StartTime)}
                            {header(SortKey::StopTime)}
                            <th>{"Duration"}</th>
                            {header(SortKey::Score)}
                            {header(SortKey::Moves)}
                            {header(SortKey::Seed)}
                            <th>{"Board"}</th>
                        </tr>
                    </thead>
                    <tbody>
                        if rows.is_empty() {
                            <tr><td colspan="7" class="empty">{"No games played yet."}</td></tr>
                        } else {
                            { for rows.into_iter().map(|entry| self.view_row(ctx, entry)) }
                        }
                    </tbody>
                </table>
            </div>
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tiles_use_palette() {
        assert_eq!(tile_color(1), "#0a9396");
        assert_eq!(tile_color(9), "#9b2226");
        assert_eq!(tile_color(0), "transparent");
    }

    #[test]
    fn larger_tiles_rotate_hue() {
        assert_eq!(tile_color(10), "hsl(36 100% 75%)");
        assert_eq!(tile_color(19), "hsl(0 100% 75%)");
    }
}
