//! Showdown between any number of known hands on a fixed board.

use crate::equity_engine::{
    codec::encode_all,
    error::{EngineError, Result},
    evaluator::{score_unchecked, validate, HandScore},
    models::{Card, Combo, HandEvaluation, WhoWinsResult},
};

/// Category name, with the royal flush singled out.
fn describe(score: HandScore) -> String {
    match score.value() {
        1 => "Royal Flush".to_string(),
        _ => score.category().name().to_string(),
    }
}

/// Score every contender once and report all of those sharing the best score.
pub fn evaluate_multiple_hands(hands: &[Combo], board: &[Card]) -> Result<WhoWinsResult> {
    if hands.is_empty() {
        return Err(EngineError::NoHands);
    }
    if board.len() > 5 {
        return Err(EngineError::BoardTooLarge(board.len()));
    }
    if board.len() + 2 < 5 {
        return Err(EngineError::InsufficientCards(board.len() + 2));
    }

    let board = encode_all(board)?;
    let mut everything = board.clone();
    for hand in hands {
        everything.extend(encode_all(&hand.cards())?);
    }
    validate(&everything)?;

    let evaluations: Vec<HandEvaluation> = hands
        .iter()
        .enumerate()
        .map(|(hand_index, hand)| {
            let mut cards = board.clone();
            cards.extend_from_slice(&everything[board.len() + 2 * hand_index..][..2]);
            let score = HandScore(score_unchecked(&cards));
            log::trace!("hand {hand_index} ({hand}) scores {}", score.value());
            HandEvaluation {
                hand_index,
                score: score.value(),
                hand_rank: score.category().name().to_string(),
                hand_description: describe(score),
            }
        })
        .collect();

    let best = evaluations.iter().map(|e| e.score).min().unwrap_or(u16::MAX);
    let winners: Vec<&HandEvaluation> = evaluations.iter().filter(|e| e.score == best).collect();
    let winning_indices: Vec<usize> = winners.iter().map(|e| e.hand_index).collect();
    let (winning_hand_rank, winning_hand_description) = winners
        .first()
        .map(|e| (e.hand_rank.clone(), e.hand_description.clone()))
        .unwrap_or_default();

    Ok(WhoWinsResult {
        is_tie: winning_indices.len() > 1,
        winning_indices,
        evaluations,
        winning_hand_rank,
        winning_hand_description,
    })
}

pub fn is_hand_winner(hand_index: usize, result: &WhoWinsResult) -> bool {
    result.winning_indices.contains(&hand_index)
}

/// Share of the pot won by `hand_index`: 1 / number of winners, or 0.
pub fn hand_pot_share(hand_index: usize, hands: &[Combo], board: &[Card]) -> Result<f64> {
    let result = evaluate_multiple_hands(hands, board)?;
    Ok(if is_hand_winner(hand_index, &result) {
        1.0 / result.winning_indices.len() as f64
    } else {
        0.0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equity_engine::codec::parse_cards;

    fn hands(list: &[&str]) -> Vec<Combo> {
        list.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn single_winner() {
        let board = parse_cards(&["Ah", "Kd", "7c", "7s", "2h"]).unwrap();
        let result = evaluate_multiple_hands(&hands(&["AsAd", "KsKh", "QcJc"]), &board).unwrap();
        assert_eq!(result.winning_indices, vec![0]);
        assert!(!result.is_tie);
        assert_eq!(result.winning_hand_rank, "Full House");
        assert_eq!(result.evaluations.len(), 3);
        assert_eq!(result.evaluations[2].hand_rank, "Pair");
    }

    #[test]
    fn three_way_with_a_split() {
        // Two identical straights in different suits; the pair loses.
        let board = parse_cards(&["9h", "8d", "7c", "2s", "2d"]).unwrap();
        let result = evaluate_multiple_hands(&hands(&["Tc6c", "Td6h", "AsAh"]), &board).unwrap();
        assert!(result.is_tie);
        assert_eq!(result.winning_indices, vec![0, 1]);
        assert_eq!(result.winning_hand_description, "Straight");
        assert!(is_hand_winner(1, &result));
        assert!(!is_hand_winner(2, &result));
    }

    #[test]
    fn pot_share_splits_between_winners() {
        let board = parse_cards(&["9h", "8d", "7c", "2s", "2d"]).unwrap();
        let field = hands(&["Tc6c", "Td6h", "AsAh"]);
        assert_eq!(hand_pot_share(0, &field, &board).unwrap(), 0.5);
        assert_eq!(hand_pot_share(2, &field, &board).unwrap(), 0.0);
    }

    #[test]
    fn royal_flush_is_described() {
        let board = parse_cards(&["Qs", "Js", "Ts", "2d", "3c"]).unwrap();
        let result = evaluate_multiple_hands(&hands(&["AsKs"]), &board).unwrap();
        assert_eq!(result.evaluations[0].score, 1);
        assert_eq!(result.winning_hand_rank, "Straight Flush");
        assert_eq!(result.winning_hand_description, "Royal Flush");
    }

    #[test]
    fn flop_board_is_enough() {
        let board = parse_cards(&["Qs", "Jd", "2c"]).unwrap();
        let result = evaluate_multiple_hands(&hands(&["QhQd", "AhKh"]), &board).unwrap();
        assert_eq!(result.winning_indices, vec![0]);
        assert_eq!(result.winning_hand_rank, "Three of a Kind");
    }

    #[test]
    fn rejects_bad_input() {
        let board = parse_cards(&["Ah", "Kd", "7c", "7s", "2h"]).unwrap();
        assert_eq!(evaluate_multiple_hands(&[], &board), Err(EngineError::NoHands));
        assert_eq!(
            evaluate_multiple_hands(&hands(&["AhQd"]), &board),
            Err(EngineError::DuplicateCard("Ah".into()))
        );
        assert_eq!(
            evaluate_multiple_hands(&hands(&["QsQd", "QcQd"]), &board),
            Err(EngineError::DuplicateCard("Qd".into()))
        );
        assert_eq!(
            evaluate_multiple_hands(&hands(&["QsQd"]), &board[..2]),
            Err(EngineError::InsufficientCards(4))
        );
    }
}
