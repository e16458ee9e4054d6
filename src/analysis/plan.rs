//! Plot configuration: pair discovery, color assignment and axis layout.
//!
//! Two peers are considered peers of each other if at least one of them has a
//! ledger history for the other inside the plotted window.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Serialize, Serializer};

use super::time_window::TimeWindow;
use super::types::*;

/// Colors available to debt ratio curves and markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotColor {
    Magenta,
    Black,
    Green,
    Orange,
    Blue,
    Red,
}

impl PlotColor {
    pub fn name(&self) -> &'static str {
        match self {
            PlotColor::Magenta => "magenta",
            PlotColor::Black => "black",
            PlotColor::Green => "green",
            PlotColor::Orange => "orange",
            PlotColor::Blue => "blue",
            PlotColor::Red => "red",
        }
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            PlotColor::Magenta => (255, 0, 255),
            PlotColor::Black => (0, 0, 0),
            PlotColor::Green => (0, 128, 0),
            PlotColor::Orange => (255, 165, 0),
            PlotColor::Blue => (0, 0, 255),
            PlotColor::Red => (255, 0, 0),
        }
    }
}

impl fmt::Display for PlotColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Two colors shared by the two directions of a peer pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorPair {
    pub first: PlotColor,
    pub second: PlotColor,
}

impl ColorPair {
    pub const fn new(first: PlotColor, second: PlotColor) -> Self {
        Self { first, second }
    }

    pub fn reversed(&self) -> Self {
        Self::new(self.second, self.first)
    }
}

/// Palette handed out to unordered peer pairs, in allocation order
pub const COLOR_PAIRS: [ColorPair; 3] = [
    ColorPair::new(PlotColor::Magenta, PlotColor::Black),
    ColorPair::new(PlotColor::Green, PlotColor::Orange),
    ColorPair::new(PlotColor::Blue, PlotColor::Red),
];

/// Parameters shown in plot titles: (field name, short title)
const PARAM_TITLES: [(&str, &str); 3] = [
    ("strategy", "RF"),
    ("upload_bandwidth", "BW"),
    ("round_burst", "RB"),
];

/// An ordered (user, peer) pair with ledger updates inside the window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservedPair {
    pub user: PeerId,
    pub peer: PeerId,
    /// Axis the user's curve for this peer is drawn on
    pub axis: usize,
    /// Curve color, taken from the color cycle
    pub color: PlotColor,
}

/// Everything the renderer needs to lay out a debt ratio figure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotPlan {
    pub title: String,
    pub kind: PlotKind,
    pub window: TimeWindow,
    /// Number of stacked sub-plots
    pub num_axes: usize,
    /// Distinct unordered peer pairs observed in the window
    pub pairs: usize,
    pub cycle_len: usize,
    /// One color per observed ordered pair, in discovery order
    pub colors: Vec<PlotColor>,
    #[serde(serialize_with = "serialize_color_map")]
    pub color_map: BTreeMap<(PeerId, PeerId), ColorPair>,
    pub observed: Vec<ObservedPair>,
    /// Axis index of every peer that owns an axis
    pub user_axes: BTreeMap<PeerId, usize>,
}

impl PlotPlan {
    /// Axis a user's curves go on, if the user has one
    pub fn axis_for(&self, user: &str) -> Option<usize> {
        match self.kind {
            PlotKind::All => Some(0),
            PlotKind::Pairs => self.user_axes.get(user).copied(),
        }
    }

    /// Colors cycled through by the curves of one axis, in drawing order
    pub fn axis_cycle(&self, axis: usize) -> Vec<PlotColor> {
        self.observed
            .iter()
            .filter(|pair| pair.axis == axis)
            .map(|pair| pair.color)
            .collect()
    }

    pub fn colors_for(&self, user: &str, peer: &str) -> Option<ColorPair> {
        self.color_map
            .get(&(user.to_string(), peer.to_string()))
            .copied()
    }

    pub fn is_observed(&self, user: &str, peer: &str) -> bool {
        self.observed
            .iter()
            .any(|pair| pair.user == user && pair.peer == peer)
    }
}

#[derive(Serialize)]
struct ColorMapEntry<'a> {
    user: &'a str,
    peer: &'a str,
    colors: ColorPair,
}

fn serialize_color_map<S>(
    map: &BTreeMap<(PeerId, PeerId), ColorPair>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(map.iter().map(|((user, peer), colors)| ColorMapEntry {
        user,
        peer,
        colors: *colors,
    }))
}

/// Build the plot configuration for `ledgers` restricted to `window`
pub fn plan(
    ledgers: &LedgerTable,
    window: TimeWindow,
    params: &ParamsTable,
    kind: PlotKind,
) -> PlotPlan {
    let mut color_map: BTreeMap<(PeerId, PeerId), ColorPair> = BTreeMap::new();
    let mut colors = Vec::new();
    let mut discovered: Vec<(PeerId, PeerId)> = Vec::new();
    let mut pairs = 0usize;

    for user in ledgers.users() {
        for (peer, entries) in ledgers.peers_of(user) {
            if user == peer || window.slice(entries).is_empty() {
                continue;
            }

            let key = (user.clone(), peer.clone());
            match color_map.get(&(peer.clone(), user.clone())) {
                Some(reverse) => colors.push(reverse.second),
                None => {
                    if pairs == COLOR_PAIRS.len() {
                        log::warn!(
                            "more than {} peer pairs in {}, plot colors will repeat",
                            COLOR_PAIRS.len(),
                            window
                        );
                    }
                    let assigned = COLOR_PAIRS[pairs % COLOR_PAIRS.len()];
                    colors.push(assigned.first);
                    color_map.insert((peer.clone(), user.clone()), assigned.reversed());
                    color_map.insert(key.clone(), assigned);
                    pairs += 1;
                }
            }
            log::debug!("observed pair {} -> {}", user, peer);
            discovered.push(key);
        }
    }

    let (num_axes, cycle_len, user_axes) = match kind {
        PlotKind::All => (1, pairs * 2, BTreeMap::new()),
        PlotKind::Pairs => {
            let members: BTreeSet<&PeerId> = discovered
                .iter()
                .flat_map(|(user, peer)| [user, peer])
                .collect();
            let user_axes: BTreeMap<PeerId, usize> = members
                .into_iter()
                .enumerate()
                .map(|(axis, id)| (id.clone(), axis))
                .collect();
            (user_axes.len(), pairs, user_axes)
        }
    };

    let observed = discovered
        .into_iter()
        .zip(colors.iter().copied())
        .map(|((user, peer), color)| {
            let axis = match kind {
                PlotKind::All => 0,
                PlotKind::Pairs => user_axes.get(&user).copied().unwrap_or(0),
            };
            ObservedPair {
                user,
                peer,
                axis,
                color,
            }
        })
        .collect();

    PlotPlan {
        title: build_title(params),
        kind,
        window,
        num_axes,
        pairs,
        cycle_len,
        colors,
        color_map,
        observed,
        user_axes,
    }
}

/// Title summarizing the experiment parameters of every peer
pub fn build_title(params: &ParamsTable) -> String {
    let mut fragments = Vec::new();
    for (field, short) in PARAM_TITLES {
        let values = params.values(field);
        if values.is_empty() {
            continue;
        }
        let distinct: BTreeSet<&String> = values.iter().collect();
        if distinct.len() == 1 {
            fragments.push(format!("{}: {}", short, title_case(&values[0])));
        } else {
            fragments.push(format!("{}s: {}", short, title_case(&values.join(", "))));
        }
    }

    if fragments.is_empty() {
        "Debt Ratio vs. Time".to_string()
    } else {
        format!("Debt Ratio vs. Time -- {}", fragments.join(", "))
    }
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn entry(time: f64, value: f64) -> LedgerEntry {
        LedgerEntry {
            time,
            value,
            sent: 1000.0,
            recv: 500.0,
        }
    }

    fn mutual_ledgers(ids: &[&str]) -> LedgerTable {
        let mut rows = Vec::new();
        for user in ids {
            for peer in ids {
                if user == peer {
                    continue;
                }
                rows.push((user.to_string(), peer.to_string(), entry(0.0, 0.5)));
                rows.push((user.to_string(), peer.to_string(), entry(10.0, 1.5)));
            }
        }
        LedgerTable::from_rows(rows)
    }

    fn params(rows: &[(&str, &str, i64)]) -> ParamsTable {
        ParamsTable::new(
            rows.iter()
                .enumerate()
                .map(|(i, (strategy, bw, rb))| {
                    let mut fields = BTreeMap::new();
                    fields.insert("strategy".to_string(), Value::from(*strategy));
                    fields.insert("upload_bandwidth".to_string(), Value::from(*bw));
                    fields.insert("round_burst".to_string(), Value::from(*rb));
                    PeerParams {
                        id: format!("p{}", i),
                        fields,
                    }
                })
                .collect(),
        )
    }

    #[test]
    fn test_three_mutual_peers_all() {
        let ledgers = mutual_ledgers(&["a", "b", "c"]);
        let plan = plan(
            &ledgers,
            TimeWindow::new(0.0, 10.0),
            &ParamsTable::default(),
            PlotKind::All,
        );

        assert_eq!(plan.pairs, 3);
        assert_eq!(plan.num_axes, 1);
        assert_eq!(plan.cycle_len, 6);
        assert_eq!(plan.colors.len(), 6);
        assert_eq!(plan.observed.len(), 6);
        assert!(plan.observed.iter().all(|p| p.axis == 0));
        // a->b, a->c, b->a, b->c, c->a, c->b
        assert_eq!(
            plan.colors,
            vec![
                PlotColor::Magenta,
                PlotColor::Green,
                PlotColor::Black,
                PlotColor::Blue,
                PlotColor::Orange,
                PlotColor::Red,
            ]
        );
    }

    #[test]
    fn test_color_map_is_symmetric() {
        let ledgers = mutual_ledgers(&["a", "b", "c"]);
        let plan = plan(
            &ledgers,
            TimeWindow::new(0.0, 10.0),
            &ParamsTable::default(),
            PlotKind::All,
        );

        for ((user, peer), colors) in &plan.color_map {
            assert_eq!(plan.colors_for(peer, user), Some(colors.reversed()));
        }
        // curve color of each direction is the first color of its pair
        for pair in &plan.observed {
            assert_eq!(
                plan.colors_for(&pair.user, &pair.peer).unwrap().first,
                pair.color
            );
        }
    }

    #[test]
    fn test_one_sided_history_is_observed() {
        let ledgers = LedgerTable::from_rows(vec![
            ("a".to_string(), "b".to_string(), entry(1.0, 1.0)),
        ]);
        let plan = plan(
            &ledgers,
            TimeWindow::new(0.0, 2.0),
            &ParamsTable::default(),
            PlotKind::Pairs,
        );

        assert_eq!(plan.pairs, 1);
        assert!(plan.is_observed("a", "b"));
        assert!(!plan.is_observed("b", "a"));
        assert_eq!(plan.colors_for("b", "a"), Some(COLOR_PAIRS[0].reversed()));
        // both peers own an axis; b's stays empty
        assert_eq!(plan.num_axes, 2);
        assert_eq!(plan.axis_for("a"), Some(0));
        assert_eq!(plan.axis_for("b"), Some(1));
        assert!(plan.axis_cycle(1).is_empty());
    }

    #[test]
    fn test_window_without_entries() {
        let ledgers = mutual_ledgers(&["a", "b"]);
        let plan = plan(
            &ledgers,
            TimeWindow::new(20.0, 30.0),
            &ParamsTable::default(),
            PlotKind::Pairs,
        );

        assert_eq!(plan.pairs, 0);
        assert_eq!(plan.num_axes, 0);
        assert!(plan.colors.is_empty());
        assert!(plan.color_map.is_empty());
    }

    #[test]
    fn test_palette_cycles_past_three_pairs() {
        let ledgers = mutual_ledgers(&["a", "b", "c", "d"]);
        let plan = plan(
            &ledgers,
            TimeWindow::new(0.0, 10.0),
            &ParamsTable::default(),
            PlotKind::All,
        );

        assert_eq!(plan.pairs, 6);
        assert_eq!(plan.colors.len(), 12);
        // fourth unordered pair (b, c) wraps to the first palette entry
        assert_eq!(plan.colors_for("b", "c"), Some(COLOR_PAIRS[0]));
    }

    #[test]
    fn test_pairs_axes_per_peer() {
        let ledgers = mutual_ledgers(&["a", "b", "c"]);
        let plan = plan(
            &ledgers,
            TimeWindow::new(0.0, 10.0),
            &ParamsTable::default(),
            PlotKind::Pairs,
        );

        assert_eq!(plan.num_axes, 3);
        assert_eq!(plan.cycle_len, 3);
        assert_eq!(plan.axis_cycle(1), vec![PlotColor::Black, PlotColor::Blue]);
    }

    #[test]
    fn test_build_title() {
        let shared = params(&[("ratio", "100", 8), ("ratio", "100", 8)]);
        assert_eq!(
            build_title(&shared),
            "Debt Ratio vs. Time -- RF: Ratio, BW: 100, RB: 8"
        );

        let mixed = params(&[("ratio", "100", 8), ("round robin", "200", 8)]);
        assert_eq!(
            build_title(&mixed),
            "Debt Ratio vs. Time -- RFs: Ratio, Round Robin, BWs: 100, 200, RB: 8"
        );

        assert_eq!(build_title(&ParamsTable::default()), "Debt Ratio vs. Time");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("round-robin ratio"), "Round-Robin Ratio");
        assert_eq!(title_case("TIT4TAT"), "Tit4Tat");
    }
}
