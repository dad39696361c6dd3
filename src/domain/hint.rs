//! Response hints: what a backend reply asks the workspace to do.
//!
//! A reply is classified once into a single [`ResponseHint`]; the workflow session
//! matches on it exhaustively. Precedence: ranking, drama adoption, platform
//! adoption, script ready, editing started.

use crate::domain::platform;
use crate::domain::{ChatReply, Drama, RankingEntry, Selection};

/// Backend step label that means scripts were produced.
pub const STEP_SCRIPT_CREATED: &str = "script_created";
/// Backend step label that means editing has started.
pub const STEP_EDITING: &str = "editing";

/// Case-insensitive keywords marking a message as a ranking query.
const RANKING_KEYWORDS: [&str; 6] = ["排行", "榜单", "排行榜", "热度", "ranking", "rank"];

const DEFAULT_CATEGORY: &str = "短剧";
const DEFAULT_THUMBNAIL: &str = "https://images.unsplash.com/photo-1664714844985-adb4fd6572ec?w=400";
const DEFAULT_EPISODES: u32 = 80;

/// Selection carried by the backend that is adopted without an artifact swap.
#[derive(Debug, Clone, PartialEq)]
pub enum Adoption {
    Drama(String),
    Platforms(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseHint {
    /// `ranking_data` was non-empty. `adoption` is only set when the user did not ask
    /// for the ranking explicitly and the reply also confirmed a selection.
    RankingReady {
        dramas: Vec<Drama>,
        adoption: Option<Adoption>,
    },
    DramaConfirmed {
        title: String,
    },
    /// Canonical ids, in backend order.
    PlatformsConfirmed {
        platform_ids: Vec<String>,
    },
    /// `drama_title`/`platform_ids` come from the reply and may be empty; the session
    /// falls back to its own selection.
    ScriptReady {
        drama_title: Option<String>,
        platform_ids: Vec<String>,
    },
    EditingStarted,
    NoHint,
}

impl ResponseHint {
    /// Classify `reply` to the user's `user_text` given what is already selected locally.
    pub fn classify(reply: &ChatReply, user_text: &str, selection: &Selection) -> Self {
        let snapshot_drama = reply
            .workflow
            .as_ref()
            .and_then(|w| w.selected_drama.clone())
            .filter(|t| !t.trim().is_empty());
        let snapshot_platforms = reply
            .workflow
            .as_ref()
            .map(|w| platform::normalize_all(&w.selected_platforms))
            .unwrap_or_default();

        let drama_adoption = snapshot_drama
            .clone()
            .filter(|_| selection.drama.is_none());
        let platform_adoption =
            Some(snapshot_platforms.clone()).filter(|p| !p.is_empty() && selection.platform_ids.is_empty());

        if !reply.ranking.is_empty() {
            let adoption = if is_ranking_intent(user_text) {
                None
            } else {
                drama_adoption
                    .map(Adoption::Drama)
                    .or_else(|| platform_adoption.map(Adoption::Platforms))
            };
            return ResponseHint::RankingReady {
                dramas: dramas_from_ranking(&reply.ranking),
                adoption,
            };
        }

        if let Some(title) = drama_adoption {
            return ResponseHint::DramaConfirmed { title };
        }
        let drama_known = snapshot_drama.is_some() || selection.drama.is_some();
        if let Some(platform_ids) = platform_adoption {
            // the backend reports the platforms and the finished script in the same reply
            if reply.step_label() == Some(STEP_SCRIPT_CREATED) && drama_known {
                return ResponseHint::ScriptReady {
                    drama_title: snapshot_drama,
                    platform_ids,
                };
            }
            return ResponseHint::PlatformsConfirmed { platform_ids };
        }

        match reply.step_label() {
            Some(STEP_SCRIPT_CREATED) if drama_known => {
                ResponseHint::ScriptReady {
                    drama_title: snapshot_drama,
                    platform_ids: snapshot_platforms,
                }
            }
            Some(STEP_EDITING) => ResponseHint::EditingStarted,
            _ => ResponseHint::NoHint,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResponseHint::RankingReady { .. } => "ranking_ready",
            ResponseHint::DramaConfirmed { .. } => "drama_confirmed",
            ResponseHint::PlatformsConfirmed { .. } => "platforms_confirmed",
            ResponseHint::ScriptReady { .. } => "script_ready",
            ResponseHint::EditingStarted => "editing_started",
            ResponseHint::NoHint => "no_hint",
        }
    }
}

/// True when `text` contains any ranking keyword (case-insensitive).
pub fn is_ranking_intent(text: &str) -> bool {
    let lower = text.to_lowercase();
    RANKING_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Turn backend ranking entries into dramas. Order is kept and `rank` is the 1-based position.
pub fn dramas_from_ranking(entries: &[RankingEntry]) -> Vec<Drama> {
    entries
        .iter()
        .enumerate()
        .map(|(i, e)| Drama {
            id: e.id.filter(|id| *id != 0).unwrap_or(i as u64 + 1),
            title: e.title.clone(),
            category: e
                .tags
                .first()
                .cloned()
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            thumbnail_url: e
                .image
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_THUMBNAIL.to_string()),
            views_display: e.views.clone(),
            likes_display: likes_from_views(&e.views),
            rank: i + 1,
            description: e.description.clone(),
            episode_count: DEFAULT_EPISODES,
            rating_out_of_10: e.score / 10.0,
        })
        .collect()
}

/// Likes estimate: the view count divided by ten, with a `K` suffix ("8500万" -> "850K").
///
/// The count is read in units of 万; a 亿 count is scaled up, so "1.2亿" reads as 12000.
pub fn likes_from_views(views: &str) -> String {
    let number: String = views
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .filter(|c| *c != ',')
        .collect();
    let mut n: f64 = number.parse().unwrap_or(0.0);
    if views.contains('亿') {
        n *= 10_000.0;
    }
    format!("{}K", (n / 10.0).floor() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WorkflowSnapshot;

    fn entry(title: &str, views: &str, score: f64) -> RankingEntry {
        RankingEntry {
            id: None,
            title: title.to_string(),
            views: views.to_string(),
            score,
            description: String::new(),
            tags: vec!["甜宠".to_string()],
            image: None,
        }
    }

    fn reply_with(
        ranking: Vec<RankingEntry>,
        drama: Option<&str>,
        platforms: &[&str],
        step: Option<&str>,
    ) -> ChatReply {
        ChatReply {
            text: "ok".to_string(),
            agent_label: Some("agent".to_string()),
            workflow: Some(WorkflowSnapshot {
                current_step: step.map(str::to_string),
                selected_drama: drama.map(str::to_string),
                selected_platforms: platforms.iter().map(|s| s.to_string()).collect(),
                script: None,
                in_workflow: true,
            }),
            current_step: step.map(str::to_string),
            ranking,
        }
    }

    #[test]
    fn test_ranking_intent_keywords() {
        assert!(is_ranking_intent("今天的短剧排行榜"));
        assert!(is_ranking_intent("看看热度"));
        assert!(is_ranking_intent("Show me the RANKING"));
        assert!(!is_ranking_intent("我想推广这部剧"));
    }

    #[test]
    fn test_dramas_from_ranking_order_and_rank() {
        let entries = vec![
            entry("A", "8500万", 95.0),
            entry("B", "7200万", 92.0),
            entry("C", "", 0.0),
        ];
        let dramas = dramas_from_ranking(&entries);
        assert_eq!(dramas.len(), 3);
        let titles: Vec<&str> = dramas.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
        for (i, d) in dramas.iter().enumerate() {
            assert_eq!(d.rank, i + 1);
            assert_eq!(d.id, i as u64 + 1);
        }
        assert_eq!(dramas[0].likes_display, "850K");
        assert_eq!(dramas[0].rating_out_of_10, 9.5);
        assert_eq!(dramas[0].category, "甜宠");
        assert_eq!(dramas[0].episode_count, 80);
        assert_eq!(dramas[2].likes_display, "0K");
        assert_eq!(dramas[2].thumbnail_url, DEFAULT_THUMBNAIL);
    }

    #[test]
    fn test_backend_id_is_kept() {
        let mut e = entry("A", "1", 10.0);
        e.id = Some(42);
        assert_eq!(dramas_from_ranking(&[e])[0].id, 42);
    }

    #[test]
    fn test_ranking_intent_short_circuits_adoption() {
        let reply = reply_with(vec![entry("A", "10", 80.0)], Some("A"), &[], None);
        let hint = ResponseHint::classify(&reply, "今天的短剧排行榜", &Selection::default());
        match hint {
            ResponseHint::RankingReady { dramas, adoption } => {
                assert_eq!(dramas.len(), 1);
                assert_eq!(adoption, None);
            }
            other => panic!("unexpected hint {other:?}"),
        }
    }

    #[test]
    fn test_ranking_without_intent_carries_adoption() {
        let reply = reply_with(vec![entry("A", "10", 80.0)], Some("A"), &[], None);
        let hint = ResponseHint::classify(&reply, "你好", &Selection::default());
        assert_eq!(
            hint,
            ResponseHint::RankingReady {
                dramas: dramas_from_ranking(&reply.ranking),
                adoption: Some(Adoption::Drama("A".to_string())),
            }
        );
    }

    #[test]
    fn test_drama_confirmed_only_when_unselected() {
        let reply = reply_with(vec![], Some("示例短剧"), &[], Some("drama_selected"));
        assert_eq!(
            ResponseHint::classify(&reply, "选这个", &Selection::default()),
            ResponseHint::DramaConfirmed {
                title: "示例短剧".to_string()
            }
        );

        let selected = Selection {
            drama: Some(Drama::titled("已选")),
            platform_ids: vec![],
        };
        assert_eq!(
            ResponseHint::classify(&reply, "选这个", &selected),
            ResponseHint::NoHint
        );
    }

    #[test]
    fn test_platforms_confirmed_are_normalized() {
        let reply = reply_with(vec![], Some("示例短剧"), &["TikTok", "X (Twitter)"], None);
        let selection = Selection {
            drama: Some(Drama::titled("示例短剧")),
            platform_ids: vec![],
        };
        assert_eq!(
            ResponseHint::classify(&reply, "抖音和推特", &selection),
            ResponseHint::PlatformsConfirmed {
                platform_ids: vec!["tiktok".to_string(), "x".to_string()]
            }
        );
    }

    #[test]
    fn test_script_ready_and_editing() {
        let selection = Selection {
            drama: Some(Drama::titled("示例短剧")),
            platform_ids: vec!["tiktok".to_string()],
        };
        let reply = reply_with(vec![], Some("示例短剧"), &["douyin"], Some(STEP_SCRIPT_CREATED));
        assert_eq!(
            ResponseHint::classify(&reply, "写脚本", &selection),
            ResponseHint::ScriptReady {
                drama_title: Some("示例短剧".to_string()),
                platform_ids: vec!["tiktok".to_string()],
            }
        );

        let reply = reply_with(vec![], None, &[], Some(STEP_EDITING));
        assert_eq!(
            ResponseHint::classify(&reply, "开始剪辑", &selection),
            ResponseHint::EditingStarted
        );
    }

    #[test]
    fn test_platforms_with_script_created_are_script_ready() {
        let reply = reply_with(vec![], Some("示例短剧"), &["抖音", "ins"], Some(STEP_SCRIPT_CREATED));
        let selection = Selection {
            drama: Some(Drama::titled("示例短剧")),
            platform_ids: vec![],
        };
        assert_eq!(
            ResponseHint::classify(&reply, "发到抖音和ins", &selection),
            ResponseHint::ScriptReady {
                drama_title: Some("示例短剧".to_string()),
                platform_ids: vec!["tiktok".to_string(), "instagram".to_string()],
            }
        );
    }

    #[test]
    fn test_likes_from_views_units() {
        assert_eq!(likes_from_views("8500万"), "850K");
        assert_eq!(likes_from_views("1.2亿"), "1200K");
        assert_eq!(likes_from_views("12,000"), "1200K");
        assert_eq!(likes_from_views("约 300万 次"), "30K");
        assert_eq!(likes_from_views("暂无"), "0K");
    }

    #[test]
    fn test_script_created_without_any_drama_is_no_hint() {
        let reply = reply_with(vec![], None, &[], Some(STEP_SCRIPT_CREATED));
        assert_eq!(
            ResponseHint::classify(&reply, "写脚本", &Selection::default()),
            ResponseHint::NoHint
        );
    }

    #[test]
    fn test_empty_reply_is_no_hint() {
        assert_eq!(
            ResponseHint::classify(&ChatReply::default(), "hi", &Selection::default()),
            ResponseHint::NoHint
        );
    }
}
