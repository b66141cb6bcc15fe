use crate::error::{DecompositionError, ProveError};
use crate::rules::{cost, expand};
use crate::sentence::Sentence;
use crate::session::CancelToken;
use crate::tree::{Node, NodeId, Tree};
use tracing::{debug, info, trace, warn};

/// Order in which sentences are decomposed
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Strategy {
    /// Alpha rules first, then the pending sentence closest to the leaf. Cheap, not minimal.
    Greedy,
    /// Searches all decomposition orders for the smallest tree. Exponential in the number of
    /// pending sentences; the search runs once and its plan is then applied step by step.
    #[default]
    Exhaustive,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ProverConfig {
    pub strategy: Strategy,
}

impl ProverConfig {
    pub fn bruteforce(enabled: bool) -> Self {
        let strategy = if enabled {
            Strategy::Exhaustive
        } else {
            Strategy::Greedy
        };
        Self { strategy }
    }
}

#[derive(Clone, Debug)]
pub struct TruthTreeResult {
    pub premises: Vec<Sentence>,
    pub tree: Tree,
    pub top_node: NodeId,
    /// Node holding the negated conclusion, where the trunk ends.
    pub conclusion_node: NodeId,
    /// Number of decomposition steps taken.
    pub steps: usize,
    pub valid: bool,
}

impl TruthTreeResult {
    pub fn top(&self) -> &Node {
        &self.tree[self.top_node]
    }

    pub fn conclusion(&self) -> &Node {
        &self.tree[self.conclusion_node]
    }

    pub fn node_count(&self) -> usize {
        self.tree.len()
    }

    pub fn open_leaves(&self) -> Vec<NodeId> {
        self.tree.open_leaves(self.conclusion_node)
    }
}

/// Decides whether `premises` entail `conclusion` by building a truth tree.
pub fn prove(
    premises: &[Sentence],
    conclusion: &Sentence,
    config: ProverConfig,
) -> Result<TruthTreeResult, ProveError> {
    prove_with_cancel(premises, conclusion, config, &CancelToken::new())
}

/// Same as [`prove`], checking `cancel` before every decomposition step.
pub fn prove_with_cancel(
    premises: &[Sentence],
    conclusion: &Sentence,
    config: ProverConfig,
    cancel: &CancelToken,
) -> Result<TruthTreeResult, ProveError> {
    for fml in premises.iter().chain([conclusion]) {
        if let Some(p) = fml.find_unsupported() {
            return Err(DecompositionError::Unsupported(p.clone()).into());
        }
    }
    let mut prover = Prover::new(premises, conclusion, cancel);
    let result = match config.strategy {
        Strategy::Greedy => prover.greedy(),
        Strategy::Exhaustive => prover.exhaustive(),
    };
    if let Err(ProveError::Cancelled) = result {
        warn!(strategy = ?config.strategy, step = prover.step, "truth tree cancelled");
    }
    result?;
    let Prover {
        tree,
        top,
        conclusion,
        step,
        ..
    } = prover;
    let valid = tree.open_leaves(conclusion).is_empty();
    let steps = step - 1;
    info!(strategy = ?config.strategy, valid, nodes = tree.len(), steps, "truth tree completed");
    Ok(TruthTreeResult {
        premises: premises.to_vec(),
        tree,
        top_node: top,
        conclusion_node: conclusion,
        steps,
        valid,
    })
}

/// State of one run: the tree under construction and the next step ordinal.
struct Prover<'c> {
    tree: Tree,
    top: NodeId,
    conclusion: NodeId,
    step: usize,
    cancel: &'c CancelToken,
}

impl<'c> Prover<'c> {
    /// Builds the trunk: every premise followed by the negated conclusion, as a single chain.
    fn new(premises: &[Sentence], conclusion: &Sentence, cancel: &'c CancelToken) -> Self {
        let mut tree = Tree::new();
        let negated = Sentence::not(conclusion.clone());
        let (top, conclusion) = match premises.split_first() {
            Some((first, rest)) => {
                let top = tree.add_root(first.clone());
                let last = rest
                    .iter()
                    .fold(top, |node, fml| tree.add_child(node, fml.clone()));
                (top, tree.add_child(last, negated))
            }
            None => {
                let top = tree.add_root(negated);
                (top, top)
            }
        };
        Self {
            tree,
            top,
            conclusion,
            step: 1,
            cancel,
        }
    }

    fn check_cancel(&self) -> Result<(), ProveError> {
        if self.cancel.is_cancelled() {
            return Err(ProveError::Cancelled);
        }
        Ok(())
    }

    /// Picks a pending sentence on the path of the first open leaf that still has one.
    ///
    /// Alpha before beta, ties go to the sentence closest to the leaf.
    fn next_greedy(&self) -> Option<NodeId> {
        self.tree
            .open_leaves(self.conclusion)
            .into_iter()
            .find_map(|leaf| {
                self.tree
                    .ancestors(leaf)
                    .filter(|&id| self.tree[id].is_pending())
                    .min_by_key(|&id| cost(self.tree[id].sentence()))
            })
    }

    /// Decomposes one pending sentence at every open leaf below it. Returns false when nothing
    /// is left to decompose.
    fn greedy_step(&mut self) -> Result<bool, ProveError> {
        let Some(node) = self.next_greedy() else {
            return Ok(false);
        };
        let expansion = expand(self.tree[node].sentence())?;
        let mut added = 0;
        for leaf in self.tree.open_leaves(node) {
            added += self.tree.grow(leaf, &expansion.branches);
        }
        self.tree.set_decomposed(node, self.step);
        debug!(
            strategy = ?Strategy::Greedy,
            step = self.step,
            sentence = %self.tree[node].sentence(),
            rule = ?expansion.rule,
            added,
            "decomposed"
        );
        self.step += 1;
        Ok(true)
    }

    fn greedy(&mut self) -> Result<(), ProveError> {
        loop {
            self.check_cancel()?;
            if !self.greedy_step()? {
                return Ok(());
            }
        }
    }

    fn exhaustive(&mut self) -> Result<(), ProveError> {
        self.check_cancel()?;
        // the search runs on a copy of the conclusion subtree, with the trunk above it as context
        let trunk = self
            .tree
            .ancestors(self.conclusion)
            .skip(1)
            .map(|id| self.tree[id].sentence().clone())
            .collect::<Vec<_>>();
        let search = self.tree.copy_from(self.conclusion);
        let Some((plan, mut remaining)) = best_plan(&search, &trunk)? else {
            return Ok(());
        };
        // the real tree grows exactly like the copy did, so the plan stays valid at every step
        for action in plan {
            self.check_cancel()?;
            let added = apply_action(&mut self.tree, self.conclusion, &action, &[], Some(self.step))?;
            remaining = remaining.saturating_sub(added);
            debug!(
                strategy = ?Strategy::Exhaustive,
                step = self.step,
                sentence = %action,
                added,
                remaining,
                "decomposed"
            );
            self.step += 1;
        }
        Ok(())
    }
}

/// First open leaf that still has actions left.
fn next_actionable(tree: &Tree, extra: &[Sentence]) -> Option<NodeId> {
    tree.open_leaves_with(NodeId::ROOT, extra)
        .into_iter()
        .find(|&leaf| !tree[leaf].action_space().is_empty())
}

/// Decomposes `action` at every open leaf below `root` that still offers it.
///
/// Returns the number of nodes added. With `step`, the pending nodes holding `action` on the
/// affected paths are marked as decomposed at that step.
fn apply_action(
    tree: &mut Tree,
    root: NodeId,
    action: &Sentence,
    extra: &[Sentence],
    step: Option<usize>,
) -> Result<usize, DecompositionError> {
    let expansion = expand(action)?;
    let leaves = tree
        .open_leaves_with(root, extra)
        .into_iter()
        .filter(|&leaf| tree[leaf].action_space().contains(action))
        .collect::<Vec<_>>();
    let mut added = 0;
    for leaf in leaves {
        if let Some(step) = step {
            let holders = tree
                .ancestors(leaf)
                .filter(|&id| tree[id].is_pending() && tree[id].sentence() == action)
                .collect::<Vec<_>>();
            for id in holders {
                tree.set_decomposed(id, step);
            }
        }
        tree.remove_action(leaf, action);
        added += tree.grow(leaf, &expansion.branches);
    }
    Ok(added)
}

/// Finds the order of actions that adds the fewest nodes until nothing is left to decompose.
///
/// Every step of the plan acts at the first actionable leaf of the tree at that point. Returns
/// the plan together with the total number of nodes it adds, or `None` when nothing is left to
/// decompose. Ties go to the earlier action.
fn best_plan(
    tree: &Tree,
    extra: &[Sentence],
) -> Result<Option<(Vec<Sentence>, usize)>, DecompositionError> {
    let Some(leaf) = next_actionable(tree, extra) else {
        return Ok(None);
    };
    let mut best: Option<(Vec<Sentence>, usize)> = None;
    for action in tree[leaf].action_space() {
        let bound = best.as_ref().map_or(usize::MAX, |(_, total)| *total);
        let mut copy = tree.clone();
        let added = apply_action(&mut copy, NodeId::ROOT, action, extra, None)?;
        if added >= bound {
            continue;
        }
        let (rest, rest_total) = best_plan(&copy, extra)?.unwrap_or_default();
        let total = added + rest_total;
        trace!(sentence = %action, added, total, "evaluated action");
        if total < bound {
            let plan = std::iter::once(action.clone()).chain(rest).collect();
            best = Some((plan, total));
        }
    }
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use insta::assert_snapshot;

    fn fml(s: &str) -> Sentence {
        parse(s).unwrap()
    }

    fn run(premises: &[&str], conclusion: &str, strategy: Strategy) -> TruthTreeResult {
        let premises = premises.iter().map(|s| fml(s)).collect::<Vec<_>>();
        prove(&premises, &fml(conclusion), ProverConfig { strategy }).unwrap()
    }

    const BOTH: [Strategy; 2] = [Strategy::Greedy, Strategy::Exhaustive];

    #[test]
    fn test_modus_ponens() {
        for strategy in BOTH {
            let result = run(&["P implies Q", "P"], "Q", strategy);
            assert!(result.valid, "{strategy:?}");
            assert!(result.open_leaves().is_empty());
        }
    }

    #[test]
    fn test_affirming_the_consequent() {
        for strategy in BOTH {
            let result = run(&["P implies Q"], "P", strategy);
            assert!(!result.valid, "{strategy:?}");
            assert!(!result.open_leaves().is_empty());
        }
        for strategy in BOTH {
            let result = run(&["P implies Q", "Q"], "P", strategy);
            assert!(!result.valid, "{strategy:?}");
        }
    }

    #[test]
    fn test_validity_agreement() {
        let cases: [(&[&str], &str, bool); 8] = [
            (&["P or Q", "not P"], "Q", true),
            (&["P -> Q", "Q -> R"], "P -> R", true),
            (&["P -> Q", "not Q"], "not P", true),
            (&["P <-> Q", "P"], "Q", true),
            (&["not (P and Q)", "P"], "not Q", true),
            (&["P or Q"], "P", false),
            (&["not (P <-> Q)"], "P or Q", true),
            (&["(not (A implies B)) or (C iif D)", "(not A and not B) implies not (A and B)"], "not C or D", false),
        ];
        for (premises, conclusion, valid) in cases {
            for strategy in BOTH {
                assert_eq!(
                    run(premises, conclusion, strategy).valid,
                    valid,
                    "{premises:?} |= {conclusion} with {strategy:?}"
                );
            }
        }
    }

    #[test]
    fn test_trunk_shape() {
        for strategy in BOTH {
            let result = run(&["A or B", "B -> C"], "C and D", strategy);
            let conclusion = result.tree.nth_single_child(result.top_node, 2);
            assert_eq!(conclusion, Some(result.conclusion_node));
            assert_eq!(result.conclusion().sentence(), &fml("not (C and D)"));
            assert_eq!(result.top().sentence(), &fml("A or B"));
            assert_eq!(result.premises, vec![fml("A or B"), fml("B -> C")]);
        }
    }

    #[test]
    fn test_trunk_simplifies_negated_conclusion() {
        let result = run(&["A"], "not A", Strategy::Greedy);
        assert_eq!(result.conclusion().sentence(), &fml("A"));
        assert!(!result.valid);
        assert_eq!(result.steps, 0);
        let result = run(&["A"], "A", Strategy::Exhaustive);
        assert!(result.valid);
        assert_eq!(result.node_count(), 2);
    }

    #[test]
    fn test_no_premises() {
        for strategy in BOTH {
            let result = run(&[], "P or not P", strategy);
            assert!(result.valid);
            assert_eq!(result.top_node, result.conclusion_node);
        }
    }

    #[test]
    fn test_exhaustive_minimality() {
        // P or Q first: 2 + 2 * 2 = 6 added nodes, not P and not Q first: 2 + 2 = 4
        let result = run(&["P or Q", "not P and not Q"], "R", Strategy::Exhaustive);
        assert!(result.valid);
        assert_eq!(result.node_count(), 3 + 4);
        assert_eq!(result.steps, 2);
        assert_eq!(result.tree[result.top_node].decomposed_at(), Some(2));
        let second = result.tree.nth_single_child(result.top_node, 1).unwrap();
        assert_eq!(result.tree[second].decomposed_at(), Some(1));
    }

    #[test]
    fn test_exhaustive_beats_greedy() {
        // greedy takes the closest beta rule; only one of the disjunctions closes anything
        let premises = ["A or B", "C or D", "not A", "not B"];
        let greedy = run(&premises, "E", Strategy::Greedy);
        let exhaustive = run(&premises, "E", Strategy::Exhaustive);
        assert!(greedy.valid && exhaustive.valid);
        assert_eq!(exhaustive.node_count(), 5 + 2);
        assert!(greedy.node_count() > exhaustive.node_count());
    }

    #[test]
    fn test_decomposition_steps() {
        let result = run(&["P implies Q", "P"], "Q", Strategy::Greedy);
        assert_snapshot!(result.tree.outline(result.top_node), @r###"
        P -> Q [1]
        P
        not Q
          not P x
          Q x
        "###);
        assert_eq!(result.steps, 1);
    }

    #[test]
    fn test_outline_exhaustive() {
        let result = run(&["A <-> B"], "A -> B", Strategy::Exhaustive);
        assert!(result.valid);
        assert_snapshot!(result.tree.outline(result.top_node), @r###"
        A <-> B [2]
        not (A -> B) [1]
        A
        not B
          A
          B x
          not A
          not B x
        "###);
    }

    #[test]
    fn test_unsupported() {
        let x = Sentence::xor(fml("A"), fml("B"));
        let result = prove(&[fml("A -> B")], &Sentence::not(x.clone()), ProverConfig::default());
        assert!(matches!(
            result,
            Err(ProveError::Decomposition(DecompositionError::Unsupported(p))) if p == x
        ));
    }

    #[test]
    fn test_cancelled() {
        let cancel = CancelToken::new();
        cancel.cancel();
        for strategy in BOTH {
            let result = prove_with_cancel(
                &[fml("A or B")],
                &fml("B or A"),
                ProverConfig { strategy },
                &cancel,
            );
            assert_eq!(result.unwrap_err(), ProveError::Cancelled);
        }
    }

    #[test]
    fn test_greedy_prefers_alpha() {
        // C or D is closer to the leaf, A and B does not branch
        let result = run(&["A and B", "C or D"], "E", Strategy::Greedy);
        assert!(!result.valid);
        assert_eq!(result.top().decomposed_at(), Some(1));
        let second = result.tree.nth_single_child(result.top_node, 1).unwrap();
        assert_eq!(result.tree[second].decomposed_at(), Some(2));
        assert_snapshot!(result.tree.outline(result.top_node), @r###"
        A and B [1]
        C or D [2]
        not E
        A
        B
          C o
          D o
        "###);
    }

    #[test]
    fn test_cancelled_between_steps() {
        let cancel = CancelToken::new();
        let premises = [fml("A or B"), fml("C or D")];
        let mut prover = Prover::new(&premises, &fml("E"), &cancel);
        assert!(prover.greedy_step().unwrap());
        cancel.cancel();
        assert_eq!(prover.greedy(), Err(ProveError::Cancelled));
        // only the first step took effect
        assert_eq!(prover.step, 2);
        assert_eq!(prover.tree.len(), 3 + 2);
        assert_eq!(prover.tree[prover.top].decomposed_at(), None);
    }

    #[test]
    fn test_exhaustive_plan() {
        let premises = [fml("A or B"), fml("not A and not B")];
        let mut tree = Tree::new();
        let top = tree.add_root(premises[0].clone());
        let conclusion = tree.add_child(top, premises[1].clone());
        let search = tree.copy_from(conclusion);
        let (plan, total) = best_plan(&search, &premises[..1]).unwrap().unwrap();
        assert_eq!(plan, vec![fml("not A and not B"), fml("A or B")]);
        assert_eq!(total, 4);
        // fully closed trees leave nothing to plan
        let mut tree = Tree::new();
        let root = tree.add_root(fml("A"));
        tree.add_child(root, fml("not A"));
        assert_eq!(best_plan(&tree, &[]).unwrap(), None);
    }

    #[test]
    fn test_bruteforce_config() {
        assert_eq!(ProverConfig::default().strategy, Strategy::Exhaustive);
        assert_eq!(ProverConfig::bruteforce(true).strategy, Strategy::Exhaustive);
        assert_eq!(ProverConfig::bruteforce(false).strategy, Strategy::Greedy);
    }
}
