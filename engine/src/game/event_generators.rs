use crate::event::{Event, EventResult};
use crate::game::Game;
use common::entities::{CardId, PlayerId};
use common::zones::Zone;

impl Game {
    //draws a card, returns the entities drawn
    pub fn draw(&mut self, player: PlayerId) -> Vec<CardId> {
        self.handle_event(Event::Draw { player })
            .into_iter()
            .filter_map(|result| match result {
                EventResult::Draw(card) => Some(card),
                _ => None,
            })
            .collect()
    }

    //discard cards, returns the discarded cards in the graveyard
    pub fn discard(&mut self, player: PlayerId, cards: Vec<CardId>) -> Vec<CardId> {
        let mut discarded = Vec::new();
        for result in self.handle_event(Event::Discard { player, cards }) {
            if let EventResult::MoveZones(moved) = result {
                discarded.extend(
                    moved
                        .into_iter()
                        .filter(|event| {
                            event.source == Some(Zone::Hand) && event.dest == Zone::Graveyard
                        })
                        .filter_map(|event| event.newent),
                );
            }
        }
        discarded
    }

    pub fn destroy(&mut self, perms: Vec<CardId>) -> Vec<EventResult> {
        self.handle_event(Event::Destroy { perms })
    }

    //Exiles objects from wherever they are
    pub fn exile(&mut self, ents: Vec<CardId>) -> Vec<EventResult> {
        self.handle_event(Event::MoveZones {
            ents,
            origin: None,
            dest: Zone::Exile,
        })
    }

    pub fn move_zones(&mut self, ents: Vec<CardId>, origin: Zone, dest: Zone) -> Vec<EventResult> {
        self.handle_event(Event::MoveZones {
            ents,
            origin: Some(origin),
            dest,
        })
    }
}
