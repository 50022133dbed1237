/// Visual order of items (runs or characters) with the given embedding
/// levels, following rule L2 of UAX #9.
///
/// `map[v]` is the logical index of the item shown at visual position `v`.
pub fn visual_order(levels: &[u8]) -> Vec<usize> {
    let level_or = levels.iter().fold(0u8, |acc, l| acc | l);
    let level_and = levels.iter().fold(1u8, |acc, l| acc & l);

    // All even: already in visual order.
    if level_or & 1 == 0 {
        return (0..levels.len()).collect();
    }
    // All odd: a single reversal suffices.
    if level_and & 1 == 1 {
        return (0..levels.len()).rev().collect();
    }

    let indices: Vec<usize> = (0..levels.len()).collect();
    let mut result = Vec::with_capacity(levels.len());
    reorder_recurse(levels, &indices, &mut result);
    result
}

/// Split `items` at the items holding the lowest level, order every band
/// of higher levels recursively, then reverse the whole sequence when the
/// lowest level is odd.
fn reorder_recurse(levels: &[u8], items: &[usize], out: &mut Vec<usize>) {
    let Some(min_level) = items.iter().map(|&i| levels[i]).min() else {
        return;
    };

    let mut pieces: Vec<Vec<usize>> = Vec::new();
    let mut band_start = 0;
    for (pos, &item) in items.iter().enumerate() {
        if levels[item] == min_level {
            if pos > band_start {
                let mut band = Vec::with_capacity(pos - band_start);
                reorder_recurse(levels, &items[band_start..pos], &mut band);
                pieces.push(band);
            }
            pieces.push(vec![item]);
            band_start = pos + 1;
        }
    }
    if items.len() > band_start {
        let mut band = Vec::with_capacity(items.len() - band_start);
        reorder_recurse(levels, &items[band_start..], &mut band);
        pieces.push(band);
    }

    if min_level % 2 == 1 {
        pieces.reverse();
    }
    for piece in pieces {
        out.extend(piece);
    }
}
