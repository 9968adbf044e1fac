//! Built-in Timber tips, canned chat replies and the tip hash used by analytics

use rand::seq::IndexedRandom;
use timber_core::models::{Tip, TipCategory};

pub const TIPS: [Tip; 8] = [
    Tip {
        id: "dam-building-1",
        category: TipCategory::Savings,
        title: "Dam-Building Basics",
        message: "Start small! Even saving $50 per month builds a strong foundation over time. Every log counts when building your financial dam.",
    },
    Tip {
        id: "termite-control-1",
        category: TipCategory::Debt,
        title: "Termite Control Strategy",
        message: "Focus on high-interest debt first (Avalanche method). It's like treating the most aggressive termites before they cause more damage!",
    },
    Tip {
        id: "resource-flow-1",
        category: TipCategory::Budget,
        title: "Managing Resource Flow",
        message: "Track where your timber (money) goes! The 50/30/20 rule is a great starting point: 50% needs, 30% wants, 20% savings.",
    },
    Tip {
        id: "foundation-check-1",
        category: TipCategory::General,
        title: "Foundation Inspection",
        message: "Review your financial picture monthly. Regular inspections help catch small issues before they become big problems!",
    },
    Tip {
        id: "emergency-stockpile-1",
        category: TipCategory::Savings,
        title: "Emergency Stockpile",
        message: "Build an emergency fund of 3-6 months expenses. It's like storing extra logs for winter - you'll be glad you did!",
    },
    Tip {
        id: "snowball-method-1",
        category: TipCategory::Debt,
        title: "Snowball Success",
        message: "Pay off smallest debts first for quick wins! Each cleared obstacle boosts your motivation to tackle the next one.",
    },
    Tip {
        id: "automation-power-1",
        category: TipCategory::Savings,
        title: "Automation is Your Friend",
        message: "Set up automatic transfers to savings. It's like having a team of beavers working while you sleep!",
    },
    Tip {
        id: "expense-tracking-1",
        category: TipCategory::Budget,
        title: "Know Your Obstacles",
        message: "Small expenses add up! That daily coffee might be costing you $150/month. Awareness is the first step to control.",
    },
];

/// Replies used when the chat model is unavailable
pub const FALLBACK_REPLIES: [&str; 5] = [
    "Great question! Let's build a solid foundation for that. Think of your budget like building a dam - you need to control the flow of water (money) to create a reservoir (savings).",
    "I see you're working on clearing some obstacles! Just like clearing logs from a stream, paying off debt takes patience and steady work. Let's create a plan together.",
    "That's a smart move! Building financial security is like constructing a strong dam - layer by layer, stick by stick. You're making excellent progress!",
    "Let me help you with that. Remember, every big project starts with gathering the right materials (information). What specific area would you like to focus on?",
    "Excellent! You're thinking like a true builder. Financial planning is all about preparing for the future - just like how we beavers prepare for winter by storing resources.",
];

/// `h * 31 + c` over UTF-16 code units with 32-bit wraparound, matching the hash the web client sends.
pub fn tip_hash(text: &str) -> u32 {
    text.encode_utf16()
        .fold(0i32, |h, c| {
            (h << 5).wrapping_sub(h).wrapping_add(i32::from(c))
        }) as u32
}

pub fn tips_by_category(category: Option<TipCategory>) -> Vec<Tip> {
    TIPS.iter()
        .filter(|tip| category.is_none_or(|c| tip.category == c))
        .cloned()
        .collect()
}

pub fn random_tip(category: Option<TipCategory>) -> Option<Tip> {
    tips_by_category(category).choose(&mut rand::rng()).cloned()
}

/// Resolve an analytics tip hash back to the built-in tip id
pub fn tip_id_for_hash(hash: i64) -> Option<&'static str> {
    TIPS.iter()
        .find(|tip| i64::from(tip_hash(tip.message)) == hash)
        .map(|tip| tip.id)
}

pub fn fallback_reply(message: &str) -> &'static str {
    FALLBACK_REPLIES[tip_hash(message) as usize % FALLBACK_REPLIES.len()]
}

fn category_for_message(message: &str) -> Option<TipCategory> {
    let lower = message.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if mentions(&["debt", "loan", "card", "payoff", "pay off", "interest"]) {
        Some(TipCategory::Debt)
    } else if mentions(&["save", "saving", "emergency", "invest"]) {
        Some(TipCategory::Savings)
    } else if mentions(&["budget", "spend", "expense", "track"]) {
        Some(TipCategory::Budget)
    } else {
        None
    }
}

/// Pick a tip related to the topic of a chat message, if any
pub fn tip_for_message(message: &str) -> Option<Tip> {
    let tips = tips_by_category(Some(category_for_message(message)?));
    if tips.is_empty() {
        return None;
    }
    Some(tips[tip_hash(message) as usize % tips.len()].clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tip_hash_known_values() {
        assert_eq!(tip_hash(""), 0);
        assert_eq!(tip_hash("a"), 97);
        assert_eq!(tip_hash("ab"), 3105);
        assert_eq!(tip_hash("hello"), 99162322);
        // wraps to i32::MIN
        assert_eq!(tip_hash("polygenelubricants"), 2147483648);
    }

    #[test]
    fn test_tip_hash_uses_utf16_units() {
        // U+1F600 is a surrogate pair: 0xD83D, 0xDE00
        let expected = (0xD83Du32).wrapping_mul(31).wrapping_add(0xDE00);
        assert_eq!(tip_hash("\u{1F600}"), expected);
    }

    #[test]
    fn test_tips_have_unique_ids_and_hashes() {
        let ids: HashSet<_> = TIPS.iter().map(|t| t.id).collect();
        let hashes: HashSet<_> = TIPS.iter().map(|t| tip_hash(t.message)).collect();
        assert_eq!(ids.len(), TIPS.len());
        assert_eq!(hashes.len(), TIPS.len());
    }

    #[test]
    fn test_tips_by_category() {
        assert_eq!(tips_by_category(None).len(), 8);
        assert_eq!(tips_by_category(Some(TipCategory::Savings)).len(), 3);
        assert_eq!(tips_by_category(Some(TipCategory::Debt)).len(), 2);
        assert_eq!(tips_by_category(Some(TipCategory::Budget)).len(), 2);
        assert_eq!(tips_by_category(Some(TipCategory::General)).len(), 1);
    }

    #[test]
    fn test_random_tip_respects_category() {
        for _ in 0..20 {
            let tip = random_tip(Some(TipCategory::Debt)).unwrap();
            assert_eq!(tip.category, TipCategory::Debt);
        }
    }

    #[test]
    fn test_tip_id_for_hash() {
        let hash = i64::from(tip_hash(TIPS[2].message));
        assert_eq!(tip_id_for_hash(hash), Some("resource-flow-1"));
        assert_eq!(tip_id_for_hash(1), None);
    }

    #[test]
    fn test_fallback_reply_is_deterministic() {
        let first = fallback_reply("How do I start saving?");
        assert_eq!(first, fallback_reply("How do I start saving?"));
        assert!(FALLBACK_REPLIES.contains(&first));
        assert_eq!(fallback_reply(""), FALLBACK_REPLIES[0]);
    }

    #[test]
    fn test_tip_for_message_follows_topic() {
        let tip = tip_for_message("Should I pay my credit card first?").unwrap();
        assert_eq!(tip.category, TipCategory::Debt);

        let tip = tip_for_message("I want an emergency fund").unwrap();
        assert_eq!(tip.category, TipCategory::Savings);

        assert!(tip_for_message("Hello Timber!").is_none());
    }
}
