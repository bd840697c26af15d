//! Keyword relevance filter for headlines.
//!
//! The term list is a data asset: it is matched as lower-cased substrings, so
//! short terms such as `"x"` or `"ad"` match inside longer words. Mixed-case
//! terms can never match a lower-cased headline and are kept as listed.

/// Politics-domain terms and named entities a headline must mention
pub const KEYWORDS: &[&str] = &[
    "trump", "elon", "musk", "maga", "biden", "harris", "gop", "republican", "democrat",
    "election", "vote", "politics", "congress", "senate", "house", "president", "vp",
    "conservative", "liberal", "breaking", "news", "report", "media", "fake", "twitter", "x",
    "post", "tweet", "elonmusk", "tesla", "spaceX", "freedom", "speech", "censorship",
    "big tech", "government", "fbi", "doj", "justice", "law", "court", "supreme", "scotus",
    "bill", "tax", "border", "wall", "immigration", "illegal", "crime", "police", "defund",
    "2nd", "amendment", "guns", "rights", "abortion", "pro-life", "pro-choice", "healthcare",
    "obamacare", "jobs", "economy", "inflation", "gas", "oil", "energy", "climate", "change",
    "hoax", "china", "russia", "ukraine", "war", "military", "veterans", "nato", "iran",
    "israel", "deal", "trade", "tariffs", "america", "usa", "patriot", "flag", "anthem",
    "woke", "crt", "critical", "race", "theory", "school", "education", "teachers", "union",
    "parents", "kids", "vaccine", "mandate", "mask", "covid", "lockdown", "fraud", "rigged",
    "ballot", "mail-in", "voter", "id", "january", "6", "capitol", "riot", "impeach",
    "desantis", "florida", "abbott", "texas", "pence", "mcconnell", "pelosi", "schumer", "aoc",
    "squad", "omar", "tlaib", "pressley", "bush", "cheney", "reagan", "romney", "cruz",
    "rubio", "haley", "pompeo", "gaetz", "greene", "boebbert", "carlson", "hannity",
    "ingraham", "beck", "shapiro", "owens", "kirk", "bannon", "flynn", "alex", "jones", "rush",
    "limbaugh", "fox", "oann", "newsmax", "breitbart", "daily", "wire", "nypost", "post",
    "rnc", "dnc", "campaign", "rally", "debate", "poll", "swing", "state", "red", "blue",
    "purple", "midterm", "2020", "2024", "2016", "win", "lose", "steal", "stop", "deep",
    "state", "swamp", "drain", "insider", "outsider", "globalist", "nationalism", "populist",
    "socialism", "communism", "capitalism", "market", "regulation", "deregulation", "budget",
    "debt", "deficit", "spending", "entitlement", "welfare", "reform", "security", "social",
    "medicare", "medicaid", "insurance", "premium", "cost", "inflationary", "recession",
    "recovery", "worker", "labor", "unionize", "strike", "business", "corporate", "taxes",
    "cut", "increase", "rich", "poor", "middle", "class", "family", "values", "religion",
    "christian", "evangelical", "church", "faith", "god", "prayer", "bible", "islam", "terror",
    "isis", "al-qaeda", "afghanistan", "iraq", "syria", "peace", "deal", "foreign", "policy",
    "diplomacy", "sanctions", "nato", "un", "who", "cdc", "fauci", "science", "trust",
    "expert", "conspiracy", "qanon", "truth", "lie", "coverup", "whistleblower", "leak",
    "source", "anonymous", "report", "investigate", "probe", "scandal", "corrupt", "ethics",
    "lobby", "donor", "pac", "super", "fund", "raise", "spend", "ad", "attack", "smear",
    "negative", "positive", "message", "platform", "agenda", "promise", "pledge", "deliver",
    "fail", "win", "loss", "turnout", "base", "grassroots", "activist", "protest", "march",
    "riot", "violence", "lawless", "order", "chaos", "control", "gun", "control", "ban",
    "assault", "rifle", "background", "check", "mental", "health", "crisis", "emergency",
    "national", "guard", "deploy", "troops", "border", "patrol", "ice", "deport", "sanctuary",
    "city", "statehood", "dc", "puerto", "rico", "gerrymander", "district", "map", "census",
    "count", "population", "shift", "urban", "rural", "suburb", "voter", "suppress", "access",
    "ballot", "drop", "box", "early", "vote", "deadline", "certify", "recount", "audit",
    "challenge", "lawsuit", "judge", "ruling", "appeal", "decision", "lawmaker", "legislature",
    "session", "pass", "veto", "override", "executive", "order", "agency", "epa", "sec", "irs",
    "treasury", "fed", "interest", "rate", "economy", "boom", "bust", "stock", "market",
    "crash", "trade", "deal", "nafta", "usmca", "tpp", "brexit", "eu", "global", "mike pence",
    "rex tillerson", "mike pompeo", "steven mnuchin", "james mattis", "patrick m. shanahan",
    "mark t. esper", "jeff sessions", "matthew g. whitaker", "william p. barr",
    "ryan k. zinke", "david l. bernhardt", "sonny perdue", "wilbur ross",
    "alexander j. acosta", "jay p. higgins", "eugene scalia", "thomas e. price",
    "don j. wright", "alex m. azar ii", "ben carson", "elaine l. chao", "rick perry",
    "betsy devos", "david j. shulkin", "robert l. wilkie", "john f. kelly", "elaine d. duke",
    "kevin k. mcaleenan", "chad f. wolf", "j.d. vance", "marco rubio", "scott m. bessent",
    "robert o'neill", "mike r. davis", "ryan z. busse", "thomas j. massie",
    "robert f. kennedy jr.", "vivek g. ramaswamy", "marty makary", "richard a. perry",
    "chris rufo", "steve bannon", "kellyanne conway", "jared kushner", "ivanka trump",
    "sean spicer", "sarah huckabee sanders", "mick mulvaney", "reince priebus",
    "ronny l. jackson", "hope hicks", "peter navarro", "michael t. flynn", "karoline leavitt",
    "chris miller", "richard grenell", "robert lighthizer", "arthur laffer", "andrew wheeler",
    "donald trump", "threat", "moon", "rocket", "space", "ai", "artificial intelligence",
];

/// True iff the lower-cased text contains at least one keyword
pub fn is_relevant(text: &str) -> bool {
    let lowered = text.to_lowercase();
    KEYWORDS.iter().any(|term| lowered.contains(term))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_case_insensitively() {
        assert!(is_relevant("Trump signs bill"));
        assert!(is_relevant("SENATE PASSES BUDGET"));
    }

    #[test]
    fn test_no_keyword_is_irrelevant() {
        assert!(!is_relevant("Local weather update"));
        assert!(!is_relevant(""));
    }

    #[test]
    fn test_multi_word_phrase() {
        assert!(is_relevant("Profile: Sarah Huckabee Sanders"));
    }

    #[test]
    fn test_substring_semantics() {
        // "un" matches inside "sunny"
        assert!(is_relevant("Sunny"));
    }

    #[test]
    fn test_agrees_with_definition() {
        let samples = [
            "Local weather update",
            "Markets rally on tariffs news",
            "Recipe of the day",
            "Pelosi speaks",
            "Cat video",
        ];
        for text in samples {
            let lowered = text.to_lowercase();
            let expected = KEYWORDS.iter().any(|k| lowered.contains(k));
            assert_eq!(is_relevant(text), expected, "{}", text);
        }
    }
}
