use super::*;

fn mv(s: &str) -> Move {
    s.parse().unwrap()
}

#[test]
fn test_bestmove_coordinate_pass_and_garbage() {
    assert_eq!(parse_line("bestmove e6"), Some(EngineMessage::BestMove(Some(mv("e6")))));
    assert_eq!(parse_line("bestmove pass"), Some(EngineMessage::BestMove(Some(Move::Pass))));
    assert_eq!(parse_line("bestmove zz"), Some(EngineMessage::BestMove(None)));
    assert_eq!(parse_line("bestmove"), Some(EngineMessage::BestMove(None)));
}

#[test]
fn test_info_fields_and_pv() {
    let Some(EngineMessage::Info(info)) = parse_line("info depth 10 score 42 pv d3 c4") else {
        panic!("expected info");
    };
    assert_eq!(info.depth, Some(10));
    assert_eq!(info.score, Some(42.0));
    assert_eq!(info.pv, vec![mv("d3"), mv("c4")]);
    assert_eq!(info.nodes, None);
}

#[test]
fn test_info_pv_stops_at_first_non_move() {
    let Some(EngineMessage::Info(info)) = parse_line("info score 5 nodes 100 pv xx d3") else {
        panic!("expected info");
    };
    assert_eq!(info.score, Some(5.0));
    assert_eq!(info.nodes, Some(100));
    assert!(info.pv.is_empty());

    let Some(EngineMessage::Info(info)) = parse_line("info pv f5 pass d6 depth 3") else {
        panic!("expected info");
    };
    assert_eq!(info.pv, vec![mv("f5"), Move::Pass, mv("d6")]);
    // keys after the variation are not read
    assert_eq!(info.depth, None);
}

#[test]
fn test_info_bad_numbers_are_dropped_per_field() {
    let Some(EngineMessage::Info(info)) =
        parse_line("info depth abc nps 12x multipv 2 nodes 9999999999 score -3.5")
    else {
        panic!("expected info");
    };
    assert_eq!(info.depth, None);
    assert_eq!(info.nps, None);
    assert_eq!(info.multipv, Some(2));
    assert_eq!(info.nodes, Some(9_999_999_999));
    assert_eq!(info.score, Some(-3.5));
}

#[test]
fn test_info_key_without_value() {
    let Some(EngineMessage::Info(info)) = parse_line("info depth") else {
        panic!("expected info");
    };
    assert_eq!(info, SearchInfo::default());
}

#[test]
fn test_id_lines() {
    assert_eq!(
        parse_line("id name Kalmia"),
        Some(EngineMessage::Id {
            field: IdField::Name,
            value: "Kalmia".into()
        })
    );
    assert_eq!(
        parse_line("id author Dev Team"),
        Some(EngineMessage::Id {
            field: IdField::Author,
            value: "Dev Team".into()
        })
    );
    assert_eq!(parse_line("id name"), None);
    assert_eq!(parse_line("id version 2"), None);
}

#[test]
fn test_scoretype() {
    assert_eq!(
        parse_line("scoretype WP min 0 max 100"),
        Some(EngineMessage::ScoreType {
            kind: ScoreType::WinRate,
            min: Some(0.0),
            max: Some(100.0)
        })
    );
    assert_eq!(
        parse_line("scoretype stone"),
        Some(EngineMessage::ScoreType {
            kind: ScoreType::DiscDiff,
            min: None,
            max: None
        })
    );
    assert_eq!(
        parse_line("scoretype foo max x min -64"),
        Some(EngineMessage::ScoreType {
            kind: ScoreType::Other,
            min: Some(-64.0),
            max: None
        })
    );
}

#[test]
fn test_unknown_and_blank_lines() {
    assert_eq!(parse_line(""), None);
    assert_eq!(parse_line("   "), None);
    assert_eq!(parse_line("hello world"), None);
    assert_eq!(parse_line("usiok"), Some(EngineMessage::UsiOk));
    assert_eq!(parse_line("  readyok  "), Some(EngineMessage::ReadyOk));
    assert_eq!(parse_line("option name playout type spin"), Some(EngineMessage::Option));
}

#[test]
fn test_command_text() {
    assert_eq!(Command::Usi.to_string(), "usi");
    assert_eq!(Command::IsReady.to_string(), "isready");
    assert_eq!(
        Command::set_option("reuse_subtree", true).to_string(),
        "setoption name reuse_subtree value true"
    );
    assert_eq!(
        Command::set_option("mode", "FAST").to_string(),
        "setoption name mode value fast"
    );
    assert_eq!(
        Command::position(&Position::new()).to_string(),
        format!("position sfen {}", Position::new().to_encoded())
    );
    assert_eq!(Command::GoPonder.to_string(), "go ponder");
    assert_eq!(Command::GameOver(GameOverKind::Draw).to_string(), "gameover draw");
}
