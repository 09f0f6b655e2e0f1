//! Integration tests for the full CFG pipeline.
//!
//! These tests drive the graph the way an optimization pass does: build a
//! module, construct the CFG, query orderings and reachability, rewrite the
//! IR with targeted graph updates, and verify the graph stays consistent
//! without ever being rebuilt.

use blockflow::prelude::*;

/// Builds a function with a conditional inside a loop:
///
/// ```text
/// 1 -> 2 (loop header, merge 7, continue 6)
/// 2 -> 3 (selection header, merge 5)
/// 3 -> {4, 5}
/// 4 -> 5
/// 5 -> 6
/// 6 -> 2 (back edge)
/// 2's branch: 3; loop exit through merge 7
/// ```
fn nested_module() -> Result<Module> {
    let mut func = Function::new(1);

    func.add_block(BasicBlock::new(
        BlockId::new(1),
        Terminator::Branch {
            target: BlockId::new(2),
        },
    ))?;

    let mut loop_header = BasicBlock::new(
        BlockId::new(2),
        Terminator::BranchConditional {
            true_target: BlockId::new(3),
            false_target: BlockId::new(7),
        },
    );
    loop_header.set_merge(Some(MergeDecl::Loop {
        merge: BlockId::new(7),
        continue_target: BlockId::new(6),
    }));
    func.add_block(loop_header)?;

    let mut sel_header = BasicBlock::new(
        BlockId::new(3),
        Terminator::BranchConditional {
            true_target: BlockId::new(4),
            false_target: BlockId::new(5),
        },
    );
    sel_header.set_merge(Some(MergeDecl::Selection {
        merge: BlockId::new(5),
    }));
    func.add_block(sel_header)?;

    func.add_block(BasicBlock::new(
        BlockId::new(4),
        Terminator::Branch {
            target: BlockId::new(5),
        },
    ))?;
    func.add_block(BasicBlock::new(
        BlockId::new(5),
        Terminator::Branch {
            target: BlockId::new(6),
        },
    ))?;
    func.add_block(BasicBlock::new(
        BlockId::new(6),
        Terminator::Branch {
            target: BlockId::new(2),
        },
    ))?;
    func.add_block(BasicBlock::new(BlockId::new(7), Terminator::Return))?;

    let mut module = Module::new();
    module.add_function(func);
    Ok(module)
}

#[test]
fn test_construction_records_every_edge() -> Result<()> {
    let module = nested_module()?;
    let cfg = Cfg::new(&module)?;

    // The loop header's preds: the entry branch and the back edge.
    assert_eq!(cfg.preds(BlockId::new(2)), &[BlockId::new(1), BlockId::new(6)]);
    // The selection merge collects the declaration, the skip edge, and the
    // then-arm's branch.
    assert_eq!(
        cfg.preds(BlockId::new(5)),
        &[BlockId::new(3), BlockId::new(3), BlockId::new(4)]
    );
    // The loop merge collects the declaration and the header's exit branch.
    assert_eq!(
        cfg.preds(BlockId::new(7)),
        &[BlockId::new(2), BlockId::new(2)]
    );
    // Boundary wiring.
    assert_eq!(cfg.preds(BlockId::new(1)), &[Cfg::PSEUDO_ENTRY]);
    assert_eq!(cfg.preds(Cfg::PSEUDO_EXIT), &[BlockId::new(7)]);
    Ok(())
}

#[test]
fn test_orderings_agree_on_nested_constructs() -> Result<()> {
    let module = nested_module()?;
    let mut cfg = Cfg::new(&module)?;
    let func = module.function(1).unwrap();

    let mut rpo = Vec::new();
    cfg.for_each_block_in_reverse_post_order(func, BlockId::new(1), |blk| rpo.push(blk.label()));
    assert_eq!(rpo.len(), 7);
    assert_eq!(rpo[0], BlockId::new(1));

    let structured = cfg.compute_structured_order(func, BlockId::new(1));
    assert_eq!(structured.len(), 7);
    let pos = |l: u32| {
        structured
            .iter()
            .position(|&b| b == BlockId::new(l))
            .unwrap()
    };
    // Headers precede their bodies.
    assert!(pos(2) < pos(3));
    assert!(pos(3) < pos(4));
    // Each merge follows its construct's body.
    assert!(pos(5) > pos(4));
    assert!(pos(7) > pos(6));
    // The loop merge is the last block of the function.
    assert_eq!(*structured.last().unwrap(), BlockId::new(7));
    Ok(())
}

#[test]
fn test_reachability_tracks_terminator_rewrites() -> Result<()> {
    let mut module = nested_module()?;
    let mut cfg = Cfg::new(&module)?;

    {
        let func = module.function(1).unwrap();
        let reachable = cfg.find_reachable_blocks(func, BlockId::new(1));
        assert_eq!(reachable.len(), 7);
    }

    // Cut the selection short: 3 now always skips to the merge. Block 4
    // becomes unreachable; its stale edge into 5 must reconcile away.
    *module
        .function_mut(1)
        .unwrap()
        .block_mut(BlockId::new(3))
        .unwrap()
        .terminator_mut() = Terminator::Branch {
        target: BlockId::new(5),
    };
    cfg.remove_non_existing_edges(&module, BlockId::new(5));
    // Both of 3's entries survive (merge declaration plus the rewritten
    // branch both still name 5), as does the stale-but-existing edge from 4.
    assert_eq!(
        cfg.preds(BlockId::new(5)),
        &[BlockId::new(3), BlockId::new(3), BlockId::new(4)]
    );

    let func = module.function(1).unwrap();
    let reachable = cfg.find_reachable_blocks(func, BlockId::new(1));
    assert!(!reachable.contains(&BlockId::new(4)));
    assert_eq!(reachable.len(), 6);
    Ok(())
}

#[test]
fn test_block_removal_keeps_graph_consistent() -> Result<()> {
    let mut module = nested_module()?;
    let mut cfg = Cfg::new(&module)?;

    // Drop the then-arm after routing the selection around it.
    *module
        .function_mut(1)
        .unwrap()
        .block_mut(BlockId::new(3))
        .unwrap()
        .terminator_mut() = Terminator::Branch {
        target: BlockId::new(5),
    };
    let removed = module
        .function_mut(1)
        .unwrap()
        .remove_block(BlockId::new(4))
        .unwrap();
    cfg.forget_block(&removed);
    cfg.remove_non_existing_edges(&module, BlockId::new(5));

    assert!(!cfg.contains(BlockId::new(4)));
    // 3's merge declaration and rewritten branch both point at 5.
    assert_eq!(
        cfg.preds(BlockId::new(5)),
        &[BlockId::new(3), BlockId::new(3)]
    );

    let func = module.function(1).unwrap();
    let order = cfg.compute_structured_order(func, BlockId::new(1));
    assert_eq!(order.len(), 6);
    Ok(())
}

#[test]
fn test_split_then_requery() -> Result<()> {
    let mut module = nested_module()?;
    let mut cfg = Cfg::new(&module)?;

    let new_header = cfg.split_loop_header(&mut module, BlockId::new(2));

    // Preheader keeps the outside edge; the new header takes the back edge.
    assert_eq!(cfg.preds(BlockId::new(2)), &[BlockId::new(1)]);
    assert_eq!(cfg.preds(new_header), &[BlockId::new(2), BlockId::new(6)]);

    let func = module.function(1).unwrap();
    let header = func.block(new_header).unwrap();
    assert!(header.is_loop_header());
    assert_eq!(header.merge_target(), Some(BlockId::new(7)));
    assert_eq!(header.continue_target(), Some(BlockId::new(6)));

    // The graph answers ordering queries without a rebuild, and the new
    // header slots between preheader and loop body.
    let order = cfg.compute_structured_order(func, BlockId::new(1));
    assert_eq!(order.len(), 8);
    let pos = |l: BlockId| order.iter().position(|&b| b == l).unwrap();
    assert!(pos(BlockId::new(2)) < pos(new_header));
    assert!(pos(new_header) < pos(BlockId::new(3)));
    assert_eq!(*order.last().unwrap(), BlockId::new(7));

    // Everything is still reachable from the function entry.
    let reachable = cfg.find_reachable_blocks(func, BlockId::new(1));
    assert_eq!(reachable.len(), 8);
    Ok(())
}

#[test]
fn test_structured_order_from_pseudo_entry_covers_orphans() -> Result<()> {
    let mut module = nested_module()?;
    module
        .function_mut(1)
        .unwrap()
        .add_block(BasicBlock::new(BlockId::new(9), Terminator::Return))?;
    let mut cfg = Cfg::new(&module)?;
    let func = module.function(1).unwrap();

    // An orphan block never shows up when starting from the entry block...
    let from_entry = cfg.compute_structured_order(func, BlockId::new(1));
    assert!(!from_entry.contains(&BlockId::new(9)));

    // ...but the pseudo-entry reaches it.
    let from_pseudo = cfg.compute_structured_order(func, Cfg::PSEUDO_ENTRY);
    assert!(from_pseudo.contains(&BlockId::new(9)));
    Ok(())
}

#[test]
fn test_dot_export_after_split() -> Result<()> {
    let mut module = nested_module()?;
    let mut cfg = Cfg::new(&module)?;
    let new_header = cfg.split_loop_header(&mut module, BlockId::new(2));

    let dot = cfg.to_dot(&module, Some("after split"));
    assert!(dot.contains("digraph cfg"));
    assert!(dot.contains(&new_header.to_string()));
    assert!(dot.contains("after split"));
    Ok(())
}
