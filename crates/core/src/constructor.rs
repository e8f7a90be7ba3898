//! Known `.tdt` constructor names.
//!
//! The mapper dispatches on [`ConstructorKind`] rather than comparing raw
//! strings, so every constructor it understands is listed exactly once here.

use crate::ast::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstructorKind {
    Tournament,
    League,
    Season,
    GamePlayers,
    GamePlayer,
    PlayerName,
    GameBuyin,
    GameBustOut,
    GameAddOn,
    GameHistoryItem,
    FeeProfile,
    GameStructure,
    GameLevel,
    GamePrizes,
    GamePrize,
}

impl ConstructorKind {
    pub fn name(self) -> &'static str {
        match self {
            ConstructorKind::Tournament => "Tournament",
            ConstructorKind::League => "League",
            ConstructorKind::Season => "Season",
            ConstructorKind::GamePlayers => "GamePlayers",
            ConstructorKind::GamePlayer => "GamePlayer",
            ConstructorKind::PlayerName => "PlayerName",
            ConstructorKind::GameBuyin => "GameBuyin",
            ConstructorKind::GameBustOut => "GameBustOut",
            ConstructorKind::GameAddOn => "GameAddOn",
            ConstructorKind::GameHistoryItem => "GameHistoryItem",
            ConstructorKind::FeeProfile => "FeeProfile",
            ConstructorKind::GameStructure => "GameStructure",
            ConstructorKind::GameLevel => "GameLevel",
            ConstructorKind::GamePrizes => "GamePrizes",
            ConstructorKind::GamePrize => "GamePrize",
        }
    }
}

impl TryFrom<&str> for ConstructorKind {
    type Error = String;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        Ok(match name {
            "Tournament" => ConstructorKind::Tournament,
            "League" => ConstructorKind::League,
            "Season" => ConstructorKind::Season,
            "GamePlayers" => ConstructorKind::GamePlayers,
            "GamePlayer" => ConstructorKind::GamePlayer,
            "PlayerName" => ConstructorKind::PlayerName,
            "GameBuyin" => ConstructorKind::GameBuyin,
            "GameBustOut" => ConstructorKind::GameBustOut,
            "GameAddOn" => ConstructorKind::GameAddOn,
            "GameHistoryItem" => ConstructorKind::GameHistoryItem,
            "FeeProfile" => ConstructorKind::FeeProfile,
            "GameStructure" => ConstructorKind::GameStructure,
            "GameLevel" => ConstructorKind::GameLevel,
            "GamePrizes" => ConstructorKind::GamePrizes,
            "GamePrize" => ConstructorKind::GamePrize,
            other => return Err(other.to_string()),
        })
    }
}

/// Classify a node: `Some((kind, arg))` if it is a `new` expression with a
/// known constructor.
pub fn classify(node: &Node) -> Option<(ConstructorKind, &Node)> {
    let (ctor, arg) = node.as_new()?;
    let kind = ConstructorKind::try_from(ctor).ok()?;
    Some((kind, arg))
}

/// If `node` is `new <kind>({...})`, return the object entries.
pub fn object_of(node: &Node, kind: ConstructorKind) -> Option<&crate::ast::Entries> {
    match classify(node) {
        Some((k, arg)) if k == kind => arg.as_object(),
        _ => None,
    }
}
