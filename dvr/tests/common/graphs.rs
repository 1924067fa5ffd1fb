use dvr::topology::Topology;

use crate::common::virtual_network::VirtualSystem;

/// A-B:2, B-C:3, no direct A-C link
pub fn line_three() -> Topology {
    Topology::from_links(&["A", "B", "C"], &[("A", "B", 2), ("B", "C", 3)]).unwrap()
}

/// three connected routers and an isolated D
pub fn isolated_fourth() -> Topology {
    Topology::from_links(
        &["A", "B", "C", "D"],
        &[("A", "B", 1), ("B", "C", 1), ("A", "C", 4)],
    )
    .unwrap()
}

/// two paths of cost 3 from A to D
pub fn equal_cost_paths() -> Topology {
    Topology::from_links(
        &["A", "B", "C", "D"],
        &[("A", "B", 1), ("A", "C", 2), ("B", "D", 2), ("C", "D", 1)],
    )
    .unwrap()
}

pub fn simple_network() -> Topology {
    Topology::from_links(
        &["A", "B", "C", "D"],
        &[
            ("A", "B", 2),
            ("A", "D", 1),
            ("B", "C", 3),
            ("B", "D", 7),
            ("C", "D", 11),
        ],
    )
    .unwrap()
}

/// A-B:5 and an isolated C
pub fn disconnected() -> Topology {
    Topology::from_links(&["A", "B", "C"], &[("A", "B", 5)]).unwrap()
}

pub fn simple_weighted() -> Topology {
    Topology::from_links(
        &["1", "2", "3", "4", "5"],
        &[
            ("1", "2", 2),
            ("1", "3", 1),
            ("2", "3", 4),
            ("2", "4", 5),
            ("3", "4", 100),
            ("3", "5", 8),
            ("4", "5", 1),
        ],
    )
    .unwrap()
}

/// `size` x `size` grid, costs vary with position so that shortest paths are not all straight
pub fn grid(size: usize) -> Topology {
    let name = |x: usize, y: usize| format!("r{x}_{y}");
    let mut nodes = Vec::new();
    for y in 0..size {
        for x in 0..size {
            nodes.push(name(x, y));
        }
    }
    let mut topology = Topology::new(nodes).unwrap();
    for y in 0..size {
        for x in 0..size {
            if x + 1 < size {
                let cost = ((x * 7 + y * 3) % 9 + 1) as u32;
                topology.add_link(&name(x, y), &name(x + 1, y), cost).unwrap();
            }
            if y + 1 < size {
                let cost = ((x * 5 + y * 11) % 13 + 1) as u32;
                topology.add_link(&name(x, y), &name(x, y + 1), cost).unwrap();
            }
        }
    }
    topology
}

pub fn vnet(topology: &Topology) -> VirtualSystem {
    VirtualSystem::create(topology)
}
