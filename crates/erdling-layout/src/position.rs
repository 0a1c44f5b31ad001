use erdling_core::{EntityId, Point, Size};
use rustc_hash::FxHashMap;

/// Assigns a world-space center to every node from the final rank ordering.
///
/// Ranks are stacked top to bottom separated by `rank_sep`; within a rank
/// nodes are packed left to right with `node_sep` gaps and the row is
/// centered on x = 0. Extents are the ring-inflated node sizes, so attribute
/// ellipses of adjacent entities get room without a second pass.
pub fn assign_centers(
    layers: &[Vec<EntityId>],
    extents: &FxHashMap<EntityId, Size>,
    node_sep: f64,
    rank_sep: f64,
) -> FxHashMap<EntityId, Point> {
    let mut centers = FxHashMap::default();
    let mut y = 0.0;

    for (i, layer) in layers.iter().enumerate() {
        if layer.is_empty() {
            continue;
        }
        let rank_height = layer
            .iter()
            .map(|n| extents[n].height)
            .fold(0.0_f64, f64::max);
        if i > 0 {
            y += rank_sep;
        }
        let center_y = y + rank_height / 2.0;

        let total_width: f64 = layer.iter().map(|n| extents[n].width).sum::<f64>()
            + node_sep * (layer.len() as f64 - 1.0);
        let mut cursor = -total_width / 2.0;
        for &node in layer {
            let w = extents[&node].width;
            centers.insert(node, Point::new(cursor + w / 2.0, center_y));
            cursor += w + node_sep;
        }
        y += rank_height;
    }
    centers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extent(pairs: &[(EntityId, f64, f64)]) -> FxHashMap<EntityId, Size> {
        pairs
            .iter()
            .map(|&(id, w, h)| (id, Size::new(w, h)))
            .collect()
    }

    #[test]
    fn rank_rows_are_centered_and_separated() {
        let (a, b, c) = (EntityId(0), EntityId(1), EntityId(2));
        let extents = extent(&[(a, 100.0, 50.0), (b, 100.0, 50.0), (c, 200.0, 80.0)]);
        let layers = vec![vec![a, b], vec![c]];
        let centers = assign_centers(&layers, &extents, 40.0, 60.0);

        // Row one: total width 240, so a at -70 and b at +70, both centered on x=0.
        assert_eq!(centers[&a], Point::new(-70.0, 25.0));
        assert_eq!(centers[&b], Point::new(70.0, 25.0));
        // Row two starts after rank height 50 plus rank_sep 60.
        assert_eq!(centers[&c], Point::new(0.0, 150.0));
    }

    #[test]
    fn horizontal_gaps_respect_node_sep() {
        let (a, b) = (EntityId(0), EntityId(1));
        let extents = extent(&[(a, 120.0, 60.0), (b, 80.0, 60.0)]);
        let centers = assign_centers(&[vec![a, b]], &extents, 50.0, 0.0);
        let gap = (centers[&b].x - 40.0) - (centers[&a].x + 60.0);
        assert_eq!(gap, 50.0);
    }
}
