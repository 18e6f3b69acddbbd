//! Detection and merging of duplicated reactions and metabolites
use std::collections::BTreeSet;
use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};
use petgraph::unionfind::UnionFind;

use crate::evidence::{EvidenceError, Item};
use crate::metabolic_model::annotation::Annotation;
use crate::metabolic_model::gene::GeneGroup;
use crate::metabolic_model::keys::{MetaboliteKey, ReactionKey};
use crate::metabolic_model::model::{Model, ModelError};
use crate::metabolic_model::reaction::Reaction;
use crate::metabolic_model::tree::TreeNode;

/// Participants of one side of a reaction, coefficients stored by their bit pattern
type Side = BTreeSet<(MetaboliteKey, u64)>;

/// Fingerprint of a reaction's stoichiometry
///
/// The two sides are kept sorted, so a reaction compares equal to the same reaction written
/// the other way round as long as the substrate coefficients were made positive.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct ReactionSignature {
    sides: (Side, Side),
}

/// Compute the signature of a reaction
///
/// Substrates keep their negative sign unless `remove_directionality` is set, in which case a
/// reaction and its reverse share a signature.
pub fn canonical_signature(reaction: &Reaction, remove_directionality: bool) -> ReactionSignature {
    let mut substrates = Side::new();
    let mut products = Side::new();
    for (metabolite, coefficient) in reaction.metabolites() {
        if *coefficient < 0. {
            let magnitude = if remove_directionality {
                coefficient.abs()
            } else {
                *coefficient
            };
            substrates.insert((*metabolite, magnitude.to_bits()));
        } else if *coefficient > 0. {
            products.insert((*metabolite, coefficient.to_bits()));
        }
    }
    let sides = if substrates <= products {
        (substrates, products)
    } else {
        (products, substrates)
    };
    ReactionSignature { sides }
}

/// Group reactions by their direction independent signature
///
/// Every reaction is part of the result, groups with a single member are not duplicates.
pub fn group_duplicate_reactions(
    model: &Model,
    reactions: &[ReactionKey],
) -> Result<IndexMap<ReactionSignature, Vec<ReactionKey>>, ModelError> {
    let mut groups: IndexMap<ReactionSignature, Vec<ReactionKey>> = IndexMap::new();
    for key in reactions {
        let signature = canonical_signature(model.reaction(*key)?, true);
        groups.entry(signature).or_default().push(*key);
    }
    Ok(groups)
}

/// Groups of at least two reactions with the same stoichiometry, ignoring direction
///
/// Reactions without metabolites are not considered.
pub fn find_duplicated_reactions(model: &Model) -> Vec<Vec<ReactionKey>> {
    let candidates: Vec<ReactionKey> = model
        .reactions()
        .iter()
        .filter(|(_, r)| !r.metabolites().is_empty())
        .map(|(k, _)| *k)
        .collect();
    // Candidates are taken from the model itself
    let groups = group_duplicate_reactions(model, &candidates).unwrap_or_default();
    groups.into_values().filter(|g| g.len() > 1).collect()
}

/// Find metabolites sharing a database identifier within the same compartment
///
/// Without a database map, each annotation of a metabolite is used as identifier, so a metabolite
/// can end up in several (overlapping) groups. With a map, only the mapped metabolites among
/// `metabolites` are grouped, by their mapped identifier.
pub fn get_duplicated_metabolites(
    model: &Model,
    metabolites: &[MetaboliteKey],
    database_map: Option<&IndexMap<MetaboliteKey, String>>,
) -> Result<IndexSet<Vec<MetaboliteKey>>, ModelError> {
    let shared: Vec<Vec<MetaboliteKey>> = match database_map {
        Some(map) => {
            let mut by_database_id: IndexMap<&String, Vec<MetaboliteKey>> = IndexMap::new();
            for key in metabolites {
                model.metabolite(*key)?;
                if let Some(identifier) = map.get(key) {
                    by_database_id.entry(identifier).or_default().push(*key);
                }
            }
            by_database_id.into_values().collect()
        }
        None => {
            let mut by_annotation: IndexMap<&Annotation, Vec<MetaboliteKey>> = IndexMap::new();
            for key in metabolites {
                for annotation in model.metabolite(*key)?.annotation.iter() {
                    by_annotation.entry(annotation).or_default().push(*key);
                }
            }
            by_annotation.into_values().collect()
        }
    };

    let mut duplicates = IndexSet::new();
    for members in shared {
        let mut by_compartment: IndexMap<Option<String>, Vec<MetaboliteKey>> = IndexMap::new();
        for key in members {
            let compartment = model.metabolite(key)?.compartment.clone();
            by_compartment.entry(compartment).or_default().push(key);
        }
        duplicates.extend(by_compartment.into_values().filter(|g| g.len() > 1));
    }
    Ok(duplicates)
}

/// Duplicated metabolites of the whole model, with overlapping groups merged
pub fn find_duplicated_metabolites(
    model: &Model,
    database_map: Option<&IndexMap<MetaboliteKey, String>>,
) -> Result<Vec<IndexSet<MetaboliteKey>>, ModelError> {
    let metabolites: Vec<MetaboliteKey> = model.metabolites().keys().copied().collect();
    let groups = get_duplicated_metabolites(model, &metabolites, database_map)?;
    Ok(merge_groups_by_overlap(groups))
}

/// Merge groups sharing at least one element
///
/// Groups are joined transitively and the output is ordered by the lowest index group each
/// merged group contains.
///
/// # Examples
/// ```rust
/// use gemeditor_core::analysis::duplicates::merge_groups_by_overlap;
/// let merged = merge_groups_by_overlap(vec![vec![1, 2], vec![2, 3], vec![4]]);
/// assert_eq!(merged.len(), 2);
/// assert!(merged[0].contains(&1) && merged[0].contains(&3));
/// ```
pub fn merge_groups_by_overlap<G, I, T>(groups: G) -> Vec<IndexSet<T>>
where
    G: IntoIterator<Item = I>,
    I: IntoIterator<Item = T>,
    T: Hash + Eq,
{
    let groups: Vec<Vec<T>> = groups
        .into_iter()
        .map(|g| g.into_iter().collect())
        .collect();
    let mut components: UnionFind<usize> = UnionFind::new(groups.len());
    let mut owner: IndexMap<&T, usize> = IndexMap::new();
    for (index, group) in groups.iter().enumerate() {
        for element in group {
            match owner.get(element) {
                Some(previous) => {
                    components.union(index, *previous);
                }
                None => {
                    owner.insert(element, index);
                }
            }
        }
    }

    // Components are entered at their lowest index group
    let roots: Vec<usize> = (0..groups.len()).map(|i| components.find_mut(i)).collect();
    let mut merged: IndexMap<usize, IndexSet<T>> = IndexMap::new();
    for (root, group) in roots.into_iter().zip(groups) {
        merged.entry(root).or_default().extend(group);
    }
    merged.into_values().filter(|g| !g.is_empty()).collect()
}

/// Detach the gene reaction rule from a reaction
///
/// A single child is returned as is, several children are moved into a new OR group which is
/// returned instead. The returned node is left without parents.
pub fn extract_genes_from_reaction(
    model: &mut Model,
    reaction: ReactionKey,
) -> Result<Option<TreeNode>, ModelError> {
    model.reaction(reaction)?;
    let children = model.children(reaction).to_vec();
    match children.as_slice() {
        [] => Ok(None),
        [child] => {
            model.remove_child(reaction, *child, true)?;
            Ok(Some(*child))
        }
        _ => {
            let group = model.add_gene_group(GeneGroup::new_or());
            for child in children {
                model.remove_child(reaction, child, false)?;
                model.add_child(group, child)?;
            }
            Ok(Some(TreeNode::GeneGroup(group)))
        }
    }
}

/// Move every evidence entity or target from `old` to `new`
fn relocate_evidences(model: &mut Model, old: Item, new: Item) -> Result<(), ModelError> {
    for key in model.item_evidences(old) {
        loop {
            match model.substitute_evidence_item(key, old, new) {
                Ok(()) => {}
                Err(EvidenceError::ItemNotLinked { .. }) => break,
                Err(EvidenceError::Model(err)) => return Err(err),
            }
        }
    }
    Ok(())
}

fn distinct<K: Hash + Eq + Copy>(keys: &[K]) -> IndexSet<K> {
    keys.iter().copied().collect()
}

/// Merge duplicated reactions into `base`
///
/// The other reactions hand over their annotations, evidences and gene reaction rules before
/// they are removed. Their rules are joined with the one of `base` by an OR group, so each
/// rule on its own still justifies the merged reaction.
///
/// Merging is best effort: keys that are no longer part of the model are logged and skipped,
/// the remaining reactions are still merged.
pub fn merge_reactions(
    model: &mut Model,
    reactions: &[ReactionKey],
    base: ReactionKey,
) -> Result<(), ModelError> {
    model.reaction(base)?;
    let others: Vec<ReactionKey> = distinct(reactions)
        .into_iter()
        .filter(|r| *r != base)
        .collect();
    tracing::debug!(base = %base, merged = others.len(), "merging reactions");

    let mut fragments: Vec<TreeNode> = extract_genes_from_reaction(model, base)?
        .into_iter()
        .collect();
    for key in others {
        let annotation = match model.reaction(key) {
            Ok(reaction) => reaction.annotation.clone(),
            Err(err) => {
                tracing::warn!(reaction = %key, error = %err, "reaction skipped in merge");
                continue;
            }
        };
        model.reaction_mut(base)?.annotation.extend(annotation);
        fragments.extend(extract_genes_from_reaction(model, key)?);
        relocate_evidences(model, Item::Reaction(key), Item::Reaction(base))?;
        model.remove_reactions(&[key])?;
    }

    match fragments.as_slice() {
        [] => {}
        [fragment] => model.add_child(base, *fragment)?,
        _ => {
            let group = model.add_gene_group(GeneGroup::new_or());
            for fragment in fragments {
                model.add_child(group, fragment)?;
            }
            model.add_child(base, group)?;
        }
    }
    Ok(())
}

/// Merge duplicated metabolites into `base`
///
/// Every reaction containing a merged metabolite is rewritten to use `base` instead, with the
/// coefficients added up where the reaction already contains `base`. Evidences and annotations
/// move to `base`, then the merged metabolites are removed from the model.
///
/// Returns the merged metabolites, never including `base`.
pub fn merge_metabolites(
    model: &mut Model,
    metabolites: &[MetaboliteKey],
    base: MetaboliteKey,
) -> Result<Vec<MetaboliteKey>, ModelError> {
    model.metabolite(base)?;
    let others: Vec<MetaboliteKey> = distinct(metabolites)
        .into_iter()
        .filter(|m| *m != base)
        .collect();
    for key in others.iter() {
        model.metabolite(*key)?;
    }
    tracing::debug!(base = %base, merged = others.len(), "merging metabolites");

    for key in others.iter() {
        for reaction in model.metabolite_reactions(*key) {
            let current = model.reaction(reaction)?.metabolites().clone();
            let mut updated: IndexMap<MetaboliteKey, f64> = IndexMap::new();
            for (metabolite, coefficient) in current.iter() {
                let metabolite = if metabolite == key { base } else { *metabolite };
                *updated.entry(metabolite).or_insert(0.) += coefficient;
            }
            model.subtract_metabolites(reaction, &current)?;
            model.add_metabolites(reaction, &updated, true)?;
        }
        relocate_evidences(model, Item::Metabolite(*key), Item::Metabolite(base))?;
        let annotation = model.metabolite(*key)?.annotation.clone();
        model.metabolite_mut(base)?.annotation.extend(annotation);
    }
    model.remove_metabolites(&others)?;
    Ok(others)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::assertion::Assertion;
    use crate::metabolic_model::gene::{Gene, GroupType};
    use crate::metabolic_model::metabolite::Metabolite;

    fn add_reaction(
        model: &mut Model,
        id: &str,
        stoichiometry: &[(MetaboliteKey, f64)],
    ) -> ReactionKey {
        let key = model.add_reaction(Reaction::new(id));
        let metabolites: IndexMap<MetaboliteKey, f64> = stoichiometry.iter().copied().collect();
        model.add_metabolites(key, &metabolites, true).unwrap();
        key
    }

    fn annotated(id: &str, compartment: &str, annotations: &[(&str, &str)]) -> Metabolite {
        let mut metabolite = Metabolite::new(id);
        metabolite.compartment = Some(compartment.to_string());
        metabolite
            .annotation
            .extend(annotations.iter().map(|(c, i)| Annotation::new(c, i)));
        metabolite
    }

    #[test]
    fn signature_ignores_direction() {
        let mut model = Model::new_empty();
        let a = model.add_metabolite(Metabolite::new("A"));
        let b = model.add_metabolite(Metabolite::new("B"));
        let forward = add_reaction(&mut model, "fwd", &[(a, -1.), (b, 1.)]);
        let reverse = add_reaction(&mut model, "rev", &[(a, 1.), (b, -1.)]);
        let forward = model.reaction(forward).unwrap();
        let reverse = model.reaction(reverse).unwrap();

        assert_eq!(
            canonical_signature(forward, true),
            canonical_signature(reverse, true)
        );
        assert_ne!(
            canonical_signature(forward, false),
            canonical_signature(reverse, false)
        );
    }

    #[test]
    fn duplicate_reaction_grouping() {
        let mut model = Model::new_empty();
        let a = model.add_metabolite(Metabolite::new("A"));
        let b = model.add_metabolite(Metabolite::new("B"));
        let r1 = add_reaction(&mut model, "R1", &[(a, -1.), (b, 1.)]);
        let r2 = add_reaction(&mut model, "R2", &[(a, 1.), (b, -1.)]);
        let r3 = add_reaction(&mut model, "R3", &[(a, 1.), (b, -2.)]);
        model.add_reaction(Reaction::new("empty1"));
        model.add_reaction(Reaction::new("empty2"));

        let groups = group_duplicate_reactions(&model, &[r1, r2, r3]).unwrap();
        assert_eq!(groups.len(), 2);
        let shared = &groups[&canonical_signature(model.reaction(r1).unwrap(), true)];
        assert_eq!(shared, &vec![r1, r2]);

        assert_eq!(find_duplicated_reactions(&model), vec![vec![r1, r2]]);
    }

    #[test]
    fn overlapping_groups_merge() {
        let merged = merge_groups_by_overlap(vec![
            vec!["m1", "m2"],
            vec!["m2", "m3"],
            vec!["m4"],
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0], IndexSet::from(["m1", "m2", "m3"]));
        assert_eq!(merged[1], IndexSet::from(["m4"]));
    }

    #[test]
    fn transitive_merge_keeps_lowest_group() {
        let merged = merge_groups_by_overlap(vec![
            vec![1, 2],
            vec![3, 4],
            vec![5],
            vec![4, 2],
            vec![5, 6],
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0], IndexSet::from([1, 2, 3, 4]));
        assert_eq!(merged[1], IndexSet::from([5, 6]));
    }

    #[test]
    fn duplicated_metabolites_by_annotation() {
        let mut model = Model::new_empty();
        let m1 = model.add_metabolite(annotated("m1", "c", &[("chebi", "1"), ("kegg", "C1")]));
        let m2 = model.add_metabolite(annotated("m2", "c", &[("chebi", "1")]));
        let m3 = model.add_metabolite(annotated("m3", "c", &[("kegg", "C1")]));
        let other_compartment = model.add_metabolite(annotated("m1_e", "e", &[("chebi", "1")]));
        let unrelated = model.add_metabolite(annotated("m5", "c", &[("chebi", "5")]));
        let all = [m1, m2, m3, other_compartment, unrelated];

        let groups = get_duplicated_metabolites(&model, &all, None).unwrap();
        assert_eq!(groups.len(), 2);
        assert!(groups.contains(&vec![m1, m2]));
        assert!(groups.contains(&vec![m1, m3]));

        let merged = find_duplicated_metabolites(&model, None).unwrap();
        assert_eq!(merged, vec![IndexSet::from([m1, m2, m3])]);
    }

    #[test]
    fn annotations_with_same_text_are_distinct() {
        let mut model = Model::new_empty();
        let m1 = model.add_metabolite(annotated("m1", "c", &[("a:b", "c")]));
        let m2 = model.add_metabolite(annotated("m2", "c", &[("a", "b:c")]));
        let groups = get_duplicated_metabolites(&model, &[m1, m2], None).unwrap();
        assert!(groups.is_empty());
    }

    #[test]
    fn duplicated_metabolites_by_database_map() {
        let mut model = Model::new_empty();
        let m1 = model.add_metabolite(annotated("m1", "c", &[]));
        let m2 = model.add_metabolite(annotated("m2", "c", &[]));
        let m3 = model.add_metabolite(annotated("m3", "c", &[]));
        let map = IndexMap::from([
            (m1, "MNXM1".to_string()),
            (m2, "MNXM1".to_string()),
            (m3, "MNXM1".to_string()),
        ]);
        let groups = get_duplicated_metabolites(&model, &[m1, m2], Some(&map)).unwrap();
        assert_eq!(groups, IndexSet::from([vec![m1, m2]]));
    }

    #[test]
    fn metabolite_merge_adds_coefficients() {
        let mut model = Model::new_empty();
        let met_a = model.add_metabolite(annotated("metA", "c", &[("chebi", "1")]));
        let met_b = model.add_metabolite(annotated("metB", "c", &[("kegg", "C1")]));
        let met_c = model.add_metabolite(Metabolite::new("metC"));
        let reaction = add_reaction(&mut model, "R", &[(met_a, -1.), (met_b, -1.), (met_c, 1.)]);
        let evidence = model
            .add_evidence(Item::Metabolite(met_a), Assertion::Present, None, None, None)
            .unwrap();

        let merged = merge_metabolites(&mut model, &[met_a, met_b], met_b).unwrap();
        assert_eq!(merged, vec![met_a]);
        assert_eq!(
            model.reaction(reaction).unwrap().metabolites(),
            &IndexMap::from([(met_b, -2.), (met_c, 1.)])
        );
        assert!(model.metabolite(met_a).is_err());
        assert_eq!(model.metabolite(met_b).unwrap().annotation.len(), 2);
        assert_eq!(
            model.evidence(evidence).unwrap().entity(),
            Some(Item::Metabolite(met_b))
        );
        assert_eq!(model.item_evidences(Item::Metabolite(met_b)), vec![evidence]);
    }

    #[test]
    fn reaction_merge_joins_gene_rules() {
        let mut model = Model::new_empty();
        let mut reactions = Vec::new();
        let mut genes = Vec::new();
        for i in 1..=3 {
            let reaction = model.add_reaction(Reaction::new(&format!("r{i}")));
            let gene = model.add_gene(Gene::new(&format!("g{i}")));
            model.add_child(reaction, gene).unwrap();
            reactions.push(reaction);
            genes.push(gene);
        }
        let base = reactions[0];
        model
            .reaction_mut(reactions[2])
            .unwrap()
            .annotation
            .insert(Annotation::new("rhea", "10000"));
        let evidence = model
            .add_evidence(
                Item::Gene(genes[1]),
                Assertion::CatalyzingReaction,
                None,
                None,
                Some(Item::Reaction(reactions[1])),
            )
            .unwrap();

        merge_reactions(&mut model, &reactions, base).unwrap();

        assert_eq!(model.reactions().len(), 1);
        let children = model.children(base).to_vec();
        assert_eq!(children.len(), 1);
        let TreeNode::GeneGroup(group) = children[0] else {
            panic!("expected a gene group below the merged reaction");
        };
        assert_eq!(model.gene_group(group).unwrap().group_type, GroupType::Or);
        assert_eq!(model.genes_of(base), genes.iter().copied().collect::<IndexSet<_>>());
        for gene in genes.iter() {
            assert_eq!(model.reactions_of(*gene), IndexSet::from([base]));
        }
        assert_eq!(model.gene_reaction_rule(base).unwrap(), "g1 or g2 or g3");
        assert!(model
            .reaction(base)
            .unwrap()
            .annotation
            .contains(&Annotation::new("rhea", "10000")));
        assert_eq!(
            model.evidence(evidence).unwrap().target(),
            Some(Item::Reaction(base))
        );
        assert!(model.gene_tree().is_consistent());
    }

    #[test]
    fn reaction_merge_without_extra_group() {
        let mut model = Model::new_empty();
        let base = model.add_reaction(Reaction::new("r1"));
        let other = model.add_reaction(Reaction::new("r2"));
        let group = model.add_gene_group(GeneGroup::new_and());
        let g1 = model.add_gene(Gene::new("g1"));
        let g2 = model.add_gene(Gene::new("g2"));
        model.add_child(other, group).unwrap();
        model.add_child(group, g1).unwrap();
        model.add_child(group, g2).unwrap();

        merge_reactions(&mut model, &[base, other], base).unwrap();
        assert_eq!(model.children(base), &[TreeNode::GeneGroup(group)]);
        assert_eq!(model.gene_reaction_rule(base).unwrap(), "g1 and g2");
    }

    #[test]
    fn reaction_merge_nests_base_rule() {
        let mut model = Model::new_empty();
        let base = model.add_reaction(Reaction::new("r1"));
        let other = model.add_reaction(Reaction::new("r2"));
        let g1 = model.add_gene(Gene::new("g1"));
        let g2 = model.add_gene(Gene::new("g2"));
        let g3 = model.add_gene(Gene::new("g3"));
        model.add_child(base, g1).unwrap();
        model.add_child(base, g2).unwrap();
        model.add_child(other, g3).unwrap();

        merge_reactions(&mut model, &[base, other], base).unwrap();

        let TreeNode::GeneGroup(outer) = model.children(base)[0] else {
            panic!("expected a gene group below the merged reaction");
        };
        assert_eq!(model.children(base).len(), 1);
        assert_eq!(model.gene_group(outer).unwrap().group_type, GroupType::Or);
        let outer_children = model.children(outer).to_vec();
        assert_eq!(outer_children.len(), 2);
        let TreeNode::GeneGroup(inner) = outer_children[0] else {
            panic!("expected the former rule of the base reaction as first fragment");
        };
        assert_eq!(model.gene_group(inner).unwrap().group_type, GroupType::Or);
        assert_eq!(
            model.children(inner),
            &[TreeNode::Gene(g1), TreeNode::Gene(g2)]
        );
        assert_eq!(outer_children[1], TreeNode::Gene(g3));
        assert_eq!(model.gene_reaction_rule(base).unwrap(), "(g1 or g2) or g3");
        assert_eq!(model.gene_groups().len(), 2);
        assert!(model.gene_tree().is_consistent());
    }

    #[test]
    fn reaction_merge_moves_both_evidence_links() {
        let mut model = Model::new_empty();
        let base = model.add_reaction(Reaction::new("r1"));
        let other = model.add_reaction(Reaction::new("r2"));
        let evidence = model
            .add_evidence(
                Item::Reaction(other),
                Assertion::Present,
                None,
                None,
                Some(Item::Reaction(other)),
            )
            .unwrap();

        merge_reactions(&mut model, &[base, other], base).unwrap();

        let moved = model.evidence(evidence).unwrap();
        assert_eq!(moved.entity(), Some(Item::Reaction(base)));
        assert_eq!(moved.target(), Some(Item::Reaction(base)));
        assert_eq!(model.item_evidences(Item::Reaction(base)), vec![evidence]);
        assert!(model.item_evidences(Item::Reaction(other)).is_empty());
        assert_eq!(model.all_evidences().len(), 1);
    }

    #[test]
    fn reaction_merge_skips_missing_reactions() {
        let mut model = Model::new_empty();
        let base = model.add_reaction(Reaction::new("r1"));
        let gone = model.add_reaction(Reaction::new("r2"));
        let other = model.add_reaction(Reaction::new("r3"));
        let gene = model.add_gene(Gene::new("g1"));
        model.add_child(other, gene).unwrap();
        model.remove_reactions(&[gone]).unwrap();

        merge_reactions(&mut model, &[base, gone, other], base).unwrap();
        assert_eq!(model.reactions().len(), 1);
        assert_eq!(model.gene_reaction_rule(base).unwrap(), "g1");
    }

    #[test]
    fn extraction_wraps_several_children() {
        let mut model = Model::new_empty();
        let reaction = model.add_reaction(Reaction::new("r1"));
        let g1 = model.add_gene(Gene::new("g1"));
        let g2 = model.add_gene(Gene::new("g2"));
        assert_eq!(extract_genes_from_reaction(&mut model, reaction).unwrap(), None);

        model.add_child(reaction, g1).unwrap();
        model.add_child(reaction, g2).unwrap();
        let Some(TreeNode::GeneGroup(group)) =
            extract_genes_from_reaction(&mut model, reaction).unwrap()
        else {
            panic!("expected a new gene group");
        };
        assert!(model.children(reaction).is_empty());
        assert_eq!(model.gene_group(group).unwrap().group_type, GroupType::Or);
        assert_eq!(
            model.children(group),
            &[TreeNode::Gene(g1), TreeNode::Gene(g2)]
        );
        assert!(model.parents(group).is_empty());
    }
}
