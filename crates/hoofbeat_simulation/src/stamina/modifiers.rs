//! Fatigue modifiers: цепочка, которая пересчитывает внешнюю усталость
//!
//! Каждый modifier получает результат предыдущего. Работает только на
//! authoritative стороне, клиент усталость не применяет вообще.

use bevy::prelude::*;

use super::record::FatigueSource;

pub trait FatigueModifier: Send + Sync + 'static {
    fn modify(&self, fatigue: f32, source: &FatigueSource) -> f32;
}

impl<F> FatigueModifier for F
where
    F: Fn(f32, &FatigueSource) -> f32 + Send + Sync + 'static,
{
    fn modify(&self, fatigue: f32, source: &FatigueSource) -> f32 {
        self(fatigue, source)
    }
}

#[derive(Component, Default)]
pub struct FatigueModifiers {
    chain: Vec<Box<dyn FatigueModifier>>,
}

impl FatigueModifiers {
    pub fn with(mut self, modifier: impl FatigueModifier) -> Self {
        self.chain.push(Box::new(modifier));
        self
    }

    pub fn apply(&self, fatigue: f32, source: &FatigueSource) -> f32 {
        self.chain
            .iter()
            .fold(fatigue, |fatigue, modifier| modifier.modify(fatigue, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stamina::record::FatigueCause;

    #[test]
    fn test_chain_in_order() {
        let modifiers = FatigueModifiers::default()
            .with(|fatigue: f32, _: &FatigueSource| fatigue * 2.0)
            .with(|fatigue: f32, source: &FatigueSource| {
                if source.cause == FatigueCause::Weather {
                    fatigue - 1.0
                } else {
                    fatigue
                }
            });

        assert_eq!(modifiers.apply(3.0, &FatigueSource::new(FatigueCause::Weather)), 5.0);
        assert_eq!(modifiers.apply(3.0, &FatigueSource::new(FatigueCause::Attack)), 6.0);
    }

    #[test]
    fn test_empty_chain_passthrough() {
        let modifiers = FatigueModifiers::default();
        assert_eq!(modifiers.apply(1.5, &FatigueSource::new(FatigueCause::Jump)), 1.5);
    }
}
