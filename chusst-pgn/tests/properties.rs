use chusst_pgn::{
    parse, Element, Game, GameTermination, Lexer, MovetextSection, Node, TagPair, Variation,
};
use proptest::prelude::*;

const PGN_ALPHABET: &str = "[\\[\\]\"(){};%$*.!?<>a-hNO0-9 \n\r\t/\\\\=+#-]{0,120}";

fn tag_pair() -> impl Strategy<Value = TagPair> {
    ("[A-Za-z][A-Za-z0-9_]{0,10}", "[ -~]{0,20}").prop_map(|(name, value)| TagPair { name, value })
}

fn element() -> impl Strategy<Value = Element> {
    prop_oneof![
        (1u32..300, any::<bool>())
            .prop_map(|(number, has_period)| Element::MoveNumber { number, has_period }),
        "[NBRQK]?[a-h]?x?[a-h][1-8][+#]?".prop_map(Element::SanMove),
        "\\$[0-9]{1,3}".prop_map(Element::Nag),
    ]
}

fn node() -> impl Strategy<Value = Node> {
    element()
        .prop_map(Node::Element)
        .prop_recursive(4, 48, 6, |inner| {
            prop::collection::vec(inner, 0..6)
                .prop_map(|elements| Node::Variation(Variation { elements }))
        })
}

fn termination() -> impl Strategy<Value = GameTermination> {
    prop_oneof![
        Just(GameTermination::WhiteWins),
        Just(GameTermination::BlackWins),
        Just(GameTermination::Draw),
        Just(GameTermination::Unknown),
    ]
}

fn game() -> impl Strategy<Value = Game> {
    (
        prop::collection::vec(tag_pair(), 1..8),
        prop::collection::vec(node(), 0..12),
        termination(),
    )
        .prop_map(|(tags, elements, termination)| Game {
            tags,
            movetext: MovetextSection {
                elements,
                termination,
            },
        })
}

proptest! {
    #[test]
    fn tags_survive_in_order(tags in prop::collection::vec(tag_pair(), 1..10), termination in termination()) {
        let mut source = String::new();
        for tag in &tags {
            source.push_str(&format!("{}\n", tag));
        }
        source.push_str(&format!("\n1. e4 {}\n", termination));

        let database = parse(&source).into_result().unwrap();
        prop_assert_eq!(database.len(), 1);
        prop_assert_eq!(&database.games[0].tags, &tags);
        prop_assert_eq!(database.games[0].termination(), termination);
    }

    #[test]
    fn written_games_parse_back(games in prop::collection::vec(game(), 1..4)) {
        let source: String = games.iter().map(|game| format!("{}\n\n", game)).collect();

        let database = parse(&source).into_result().unwrap();
        prop_assert_eq!(database.games, games);
    }

    #[test]
    fn tokens_cover_the_input(input in PGN_ALPHABET) {
        let mut offset = 0;
        for token in Lexer::new(&input) {
            prop_assert_eq!(token.span.start, offset);
            prop_assert_eq!(token.text, &input[token.span.start..token.span.end]);
            prop_assert!(!token.text.is_empty());
            offset = token.span.end;
        }
        prop_assert_eq!(offset, input.len());
    }

    #[test]
    fn any_text_parses_without_panicking(input in prop_oneof![PGN_ALPHABET.boxed(), any::<String>().boxed()]) {
        let report = parse(&input);

        for outcome in &report.outcomes {
            prop_assert!(outcome.span().end <= input.len());
        }
        for error in report.errors() {
            prop_assert!(error.line() >= 1);
            prop_assert!(error.span().end <= input.len());
        }
        prop_assert!(report.database.len() <= report.outcomes.len());
    }
}
