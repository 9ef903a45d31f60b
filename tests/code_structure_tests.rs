// tests/code_structure_tests.rs

mod common;

use common::yaml;
use mplcheck::ast::SourceNode;
use mplcheck::expression::YaqlChecker;
use mplcheck::validation::grammar::GRAMMAR;
use mplcheck::validation::structure::{validate_block, CodeStructureChecker};
use mplcheck::Diagnostic;

fn check(node: &SourceNode) -> Vec<Diagnostic> {
    validate_block(node, &YaqlChecker::default())
}

fn messages(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics.iter().map(|d| d.message.as_str()).collect()
}

fn codes(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics.iter().map(|d| d.code).collect()
}

mod scenarios {
    use super::*;

    #[test]
    fn expression_body_is_valid() {
        assert!(check(&SourceNode::string("$.deploy()")).is_empty());
    }

    #[test]
    fn while_without_do() {
        let diagnostics = check(&yaml("While: $.deploy()\n"));
        assert_eq!(
            messages(&diagnostics),
            ["Missing keyword \"Do\" for \"While\" code structure"]
        );
        assert_eq!(diagnostics[0].code, "E205");
    }

    #[test]
    fn missing_and_unknown_keywords_are_reported_together() {
        let diagnostics = check(&yaml("While: $.deploy()\nDoes:\n  - $.a()\n  - $.b()\n"));
        assert_eq!(
            messages(&diagnostics),
            [
                "Missing keyword \"Do\" for \"While\" code structure",
                "Unknown keyword \"Does\" in \"While\"",
            ]
        );
    }

    #[test]
    fn non_string_assignment_key() {
        let diagnostics = check(&yaml("- 1: new(Foo)\n"));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("Not valid variable name \"1\""));
    }
}

mod constructs {
    use super::*;

    #[test]
    fn try_with_non_string_exception_type() {
        let body = yaml(
            "\
Try:
  - $.foo()
Catch:
With: 213
As: e
Do:
  - $.bar()
",
        );
        let diagnostics = check(&body);
        assert_eq!(codes(&diagnostics), ["E203"]);
        assert_eq!(diagnostics[0].message, "Value should be string type \"213\"");
        assert_eq!((diagnostics[0].line, diagnostics[0].column), (Some(4), Some(7)));
    }

    #[test]
    fn break_must_not_carry_a_value() {
        let diagnostics = check(&yaml("Break: a\n"));
        assert_eq!(messages(&diagnostics), ["There should be no value here \"a\""]);
    }

    #[test]
    fn empty_return_is_allowed() {
        assert!(check(&yaml("Return: ''\n")).is_empty());
        assert!(check(&yaml("Return:\n")).is_empty());
    }

    #[test]
    fn switch_with_predicate_cases() {
        let body = yaml(
            "\
Switch:
  $.x > 1:
    - $.a()
  $.x < 0: $.b()
Default:
  - $.c()
",
        );
        assert!(check(&body).is_empty());
    }

    #[test]
    fn match_cases_must_be_a_mapping() {
        let diagnostics = check(&yaml("Match: $.x\nDefault: $.y()\n"));
        assert_eq!(messages(&diagnostics), ["Cases of \"Match\" should be a mapping"]);
        assert_eq!(diagnostics[0].code, "E206");
    }

    #[test]
    fn nested_switch_cases_name_their_construct() {
        let body = yaml(
            "\
Match:
  one:
    - Switch: [$.a, $.b]
      Default: $.c()
Default: $.d()
",
        );
        let diagnostics = check(&body);
        assert_eq!(messages(&diagnostics), ["Cases of \"Switch\" should be a mapping"]);
        assert_eq!((diagnostics[0].line, diagnostics[0].column), (Some(3), Some(15)));
    }

    #[test]
    fn match_with_literal_cases() {
        let body = yaml(
            "\
Match:
  1: $.one()
  two: $.two()
Value: $.x
Default: $.other()
",
        );
        assert!(check(&body).is_empty());
    }

    #[test]
    fn repeat_and_parallel() {
        let body = yaml(
            "\
- Repeat: 3
  Do:
    - $.retry()
- Parallel:
    - $.a()
    - $.b()
  Limit: 2
",
        );
        assert!(check(&body).is_empty());
    }

    #[test]
    fn for_loop_without_in() {
        let diagnostics = check(&yaml("For: item\nDo: $.use($item)\n"));
        assert_eq!(
            messages(&diagnostics),
            ["Missing keyword \"In\" for \"For\" code structure"]
        );
    }

    #[test]
    fn try_reports_every_missing_keyword_in_grammar_order() {
        let diagnostics = check(&yaml("Try: $.foo()\n"));
        assert_eq!(
            messages(&diagnostics),
            [
                "Missing keyword \"Catch\" for \"Try\" code structure",
                "Missing keyword \"With\" for \"Try\" code structure",
                "Missing keyword \"As\" for \"Try\" code structure",
                "Missing keyword \"Do\" for \"Try\" code structure",
            ]
        );
    }

    #[test]
    fn every_construct_reports_each_missing_child_once() {
        for rule in GRAMMAR {
            let node = SourceNode::mapping(vec![(rule.keyword.into(), SourceNode::null())]);
            let diagnostics = check(&node);
            let expected = rule.required_children().count();
            assert_eq!(diagnostics.len(), expected, "{}", rule.keyword);
            assert!(diagnostics.iter().all(|d| d.code == "E205"), "{}", rule.keyword);
        }
    }

    #[test]
    fn every_unknown_key_is_reported() {
        let diagnostics = check(&yaml("If: $.a()\nThen: $.b()\nOtherwise: $.c()\nFinally: $.d()\n"));
        assert_eq!(
            messages(&diagnostics),
            [
                "Unknown keyword \"Otherwise\" in \"If\"",
                "Unknown keyword \"Finally\" in \"If\"",
            ]
        );
    }
}

mod shapes {
    use super::*;

    #[test]
    fn nested_blocks_are_descended() {
        let body = yaml(
            "\
If: $.ready()
Then:
  While: $.busy()
  Do:
    - www: $.wait()
",
        );
        let diagnostics = check(&body);
        assert_eq!(messages(&diagnostics), ["Not valid variable name \"www\""]);
        assert_eq!((diagnostics[0].line, diagnostics[0].column), (Some(5), Some(7)));
    }

    #[test]
    fn multi_key_mapping_without_construct() {
        let diagnostics = check(&yaml("$a: 1\n$b: 2\n"));
        assert_eq!(
            messages(&diagnostics),
            ["Wrong code structure/assignment probably typo"]
        );
        assert_eq!(diagnostics[0].code, "E200");
    }

    #[test]
    fn empty_mapping_is_malformed() {
        let diagnostics = check(&SourceNode::mapping(vec![]));
        assert_eq!(codes(&diagnostics), ["E200"]);
    }

    #[test]
    fn invalid_expression_leaf() {
        let diagnostics = check(&yaml("- $.deploy(\n- $.fine()\n"));
        assert_eq!(messages(&diagnostics), ["Not a valid yaql expression \"$.deploy(\""]);
        assert_eq!(diagnostics[0].code, "E202");
    }

    #[test]
    fn assignment_value_is_an_expression() {
        let diagnostics = check(&yaml("$result: $.compute(\n"));
        assert_eq!(codes(&diagnostics), ["E202"]);
    }

    #[test]
    fn literal_scalars_are_valid() {
        assert!(check(&yaml("- 42\n- true\n- 1.5\n")).is_empty());
        assert!(check(&yaml("$count: 0\n")).is_empty());
    }

    #[test]
    fn data_literals_are_not_descended() {
        let body = yaml("$template:\n  resources:\n    Bogus: [1, 2]\n");
        assert!(check(&body).is_empty());
    }

    #[test]
    fn ambiguous_mapping_resolves_by_grammar_order() {
        let diagnostics = check(&yaml("While: $.a()\nIf: $.b()\nThen: $.c()\n"));
        assert_eq!(messages(&diagnostics), ["Unknown keyword \"While\" in \"If\""]);
    }

    #[test]
    fn diagnostics_follow_element_order() {
        let body = yaml("- While: $.a()\n- $.b(\n- Break: now\n");
        assert_eq!(codes(&check(&body)), ["E205", "E202", "E204"]);
    }

    #[test]
    fn validation_is_idempotent() {
        let body = yaml(
            "\
- While: $.a()
  Does: $.b()
- $x-y: 1
- If: $.c(
  Then: []
",
        );
        let checker = YaqlChecker::default();
        let structure = CodeStructureChecker::new(&checker);
        let first = structure.validate_block(&body);
        let second = structure.validate_block(&body);
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn construct_diagnostics_point_at_the_keyword() {
        let diagnostics = check(&yaml("- $.ok()\n- While: $.deploy()\n"));
        assert_eq!((diagnostics[0].line, diagnostics[0].column), (Some(2), Some(3)));
        assert_eq!(diagnostics[0].file.as_deref(), Some("test.yaml"));
    }
}
