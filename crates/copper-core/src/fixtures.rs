//! Sample networks for tests and benchmarks.
//!
//! [`three_bus`] mirrors the CSV export under `test_data/pypsa/three_bus`.

use crate::{
    Bus, Carrier, Generator, Line, Link, Load, Network, Snapshot, SnapshotFrame,
};

fn snapshots() -> Vec<Snapshot> {
    ["2013-01-01 00:00:00", "2013-01-01 02:00:00", "2013-01-01 04:00:00"]
        .iter()
        .map(|s| s.parse().expect("fixture snapshot"))
        .collect()
}

fn frame(snapshots: &[Snapshot], columns: &[&str], rows: &[&[f64]]) -> SnapshotFrame {
    SnapshotFrame::from_rows(
        snapshots.to_vec(),
        columns.iter().map(|c| c.to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|v| Some(*v)).collect())
            .collect(),
    )
    .expect("fixture frame")
}

/// Three buses in northern Germany, two lines, one link, four generators,
/// three snapshots two hours apart.
pub fn three_bus() -> Network {
    let mut network = Network::new("three_bus");
    network
        .add_bus(Bus::new("1004", 9.0, 53.0).with_v_nom(380.0))
        .expect("bus");
    network
        .add_bus(Bus::new("1005", 10.0, 54.0).with_v_nom(380.0))
        .expect("bus");
    network
        .add_bus(Bus::new("1208", 8.0, 52.0).with_v_nom(220.0))
        .expect("bus");

    network
        .add_line(Line::new("L1", "1004", "1005").with_s_nom(100.0))
        .expect("line");
    network
        .add_line(Line::new("L2", "1005", "1208").with_s_nom(50.0))
        .expect("line");
    network
        .add_link(
            Link::new("K1", "1004", "1208")
                .with_p_nom(40.0)
                .with_carrier("DC"),
        )
        .expect("link");

    network
        .add_generator(
            Generator::new("1004 solar", "1004", "solar")
                .with_p_nom(46.0)
                .with_p_nom_opt(46.245459),
        )
        .expect("generator");
    network
        .add_generator(
            Generator::new("1005 onwind", "1005", "onwind")
                .with_p_nom(30.0)
                .with_p_nom_opt(33.99428),
        )
        .expect("generator");
    network
        .add_generator(
            Generator::new("1005 offwind-ac", "1005", "offwind-ac")
                .with_p_nom(0.5)
                .with_p_nom_opt(0.586715),
        )
        .expect("generator");
    network
        .add_generator(Generator::new("1208 CCGT", "1208", "CCGT").with_p_nom(476.0))
        .expect("generator");

    for bus in ["1004", "1005", "1208"] {
        network.add_load(Load::new(bus, bus)).expect("load");
    }

    network.add_carrier(Carrier::new("solar").with_nice_name("Solar"));
    network.add_carrier(Carrier::new("onwind").with_nice_name("Onshore Wind"));
    network.add_carrier(Carrier::new("offwind-ac").with_nice_name("Offshore Wind (AC)"));
    network.add_carrier(Carrier::new("CCGT").with_nice_name("Combined-Cycle Gas"));

    let s = snapshots();
    network.set_snapshots(s.clone());

    let gens = ["1004 solar", "1005 onwind", "1005 offwind-ac", "1208 CCGT"];
    network.generators_t.p = frame(
        &s,
        &gens,
        &[
            &[0.0, 1.555266, 0.023185, 40.0],
            &[32.479277, 2.965762, 0.032157, 20.0],
            &[13.0, 10.0, 0.2, 0.0],
        ],
    );
    network.generators_t.p_max_pu = frame(
        &s,
        &gens[..3],
        &[
            &[0.0, 0.045753, 0.039598],
            &[0.702325, 0.087245, 0.054890],
            &[0.5, 0.3, 0.4],
        ],
    );

    let buses = ["1004", "1005", "1208"];
    let loads = frame(
        &s,
        &buses,
        &[&[59.5, 20.0, 30.0], &[86.04, 25.0, 28.0], &[40.0, 10.0, 5.0]],
    );
    network.loads_t.p = loads.clone();
    network.loads_t.p_set = loads;

    network.buses_t.p = frame(
        &s,
        &buses,
        &[
            &[-59.5, -18.421549, 10.0],
            &[-53.560723, -22.002081, -8.0],
            &[-27.0, 0.2, -5.0],
        ],
    );
    network.buses_t.marginal_price = frame(
        &s,
        &buses,
        &[&[20.0, 25.0, 30.0], &[45.0, 50.0, 1000.0], &[15.0, 18.0, 22.0]],
    );

    network.lines_t.p0 = frame(
        &s,
        &["L1", "L2"],
        &[&[-30.0, 25.0], &[99.5, -50.0], &[10.0, -5.0]],
    );
    network.links_t.p0 = frame(&s, &["K1"], &[&[-20.0], &[40.0], &[0.0]]);

    network
}

/// A `rows` × `cols` lattice of buses with a line between lattice
/// neighbours, one solar generator and one load per bus and synthetic
/// hourly series. Used by the benchmarks.
pub fn grid(rows: usize, cols: usize, hours: usize) -> Network {
    let mut network = Network::new(format!("grid_{rows}x{cols}"));
    let name = |r: usize, c: usize| format!("{r}-{c}");
    for r in 0..rows {
        for c in 0..cols {
            network
                .add_bus(Bus::new(name(r, c), 5.0 + c as f64 * 0.5, 47.0 + r as f64 * 0.5))
                .expect("bus");
        }
    }
    let mut lines = Vec::new();
    for r in 0..rows {
        for c in 0..cols {
            if c + 1 < cols {
                lines.push((name(r, c), name(r, c + 1)));
            }
            if r + 1 < rows {
                lines.push((name(r, c), name(r + 1, c)));
            }
        }
    }
    for (i, (a, b)) in lines.iter().enumerate() {
        network
            .add_line(Line::new(format!("L{i}"), a.as_str(), b.as_str()).with_s_nom(100.0))
            .expect("line");
    }
    let buses = network.bus_names();
    for bus in &buses {
        network
            .add_generator(
                Generator::new(format!("{bus} solar"), bus.as_str(), "solar").with_p_nom(50.0),
            )
            .expect("generator");
        network.add_load(Load::new(bus.as_str(), bus.as_str())).expect("load");
    }

    let base: chrono::NaiveDateTime = "2013-01-01T00:00:00".parse().expect("timestamp");
    let snapshots: Vec<Snapshot> = (0..hours)
        .map(|h| Snapshot::new(base + chrono::Duration::hours(h as i64)))
        .collect();
    network.set_snapshots(snapshots.clone());

    let gen_names: Vec<String> = buses.iter().map(|b| format!("{b} solar")).collect();
    let line_names: Vec<String> = (0..lines.len()).map(|i| format!("L{i}")).collect();
    let wave =
        |h: usize, i: usize| ((h as f64 / 24.0 + i as f64 * 0.01) * std::f64::consts::TAU).sin();

    let mut gen_p = SnapshotFrame::new(snapshots.clone(), gen_names);
    let mut load_p = SnapshotFrame::new(snapshots.clone(), buses.clone());
    let mut bus_p = SnapshotFrame::new(snapshots.clone(), buses.clone());
    let mut line_p0 = SnapshotFrame::new(snapshots, line_names);
    for h in 0..hours {
        for i in 0..buses.len() {
            let generation = 25.0 + 25.0 * wave(h, i);
            let load = 30.0 + 10.0 * wave(h + 6, i);
            gen_p.set(h, i, Some(generation));
            load_p.set(h, i, Some(load));
            bus_p.set(h, i, Some(generation - load));
        }
        for i in 0..lines.len() {
            line_p0.set(h, i, Some(80.0 * wave(h, i)));
        }
    }
    network.generators_t.p = gen_p;
    network.loads_t.p = load_p.clone();
    network.loads_t.p_set = load_p;
    network.buses_t.p = bus_p;
    network.lines_t.p0 = line_p0;
    network
}
