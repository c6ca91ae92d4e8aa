use std::collections::HashMap;

use pest::iterators::Pair;

use crate::{new_parser_error, Result, Rule};

pub type LabelMap<'i> = HashMap<&'i str, usize>;

/// First pass over the instruction list: binds each label to the index of
/// the instruction it prefixes. Duplicate labels are an error.
pub fn collect_labels<'i>(labeled: &[Pair<'i, Rule>]) -> Result<LabelMap<'i>> {
    let mut labels = LabelMap::new();
    for (index, pair) in labeled.iter().enumerate() {
        let first = pair.clone().into_inner().next().unwrap();
        if first.as_rule() != Rule::label {
            continue;
        }
        let identifier = first.into_inner().next().unwrap();
        let name = identifier.as_str();
        if labels.insert(name, index).is_some() {
            return Err(new_parser_error(
                identifier.as_span(),
                format!("Repeating label \"{}\" is prohibited", name),
            ));
        }
    }
    Ok(labels)
}
