// INICIO DEL ARCHIVO [libs/core/math-engine/src/kangaroo/herd.rs]
//! =================================================================
//! APARATO: HERD MANAGER (V1.0)
//! CLASIFICACIÓN: CORE MATH / KANGAROO (ESTRATO L1)
//! RESPONSABILIDAD: CICLO DE VIDA DE LAS POBLACIONES TAME/WILD
//! =================================================================
//!
//! Asigna N kangaroos con paridad 50/50 TAME/WILD y posiciones iniciales
//! según `4.C`: tame arranca en `start·G` con `dist = start`; wild arranca
//! en `P - wildOffset·G` con `dist = 0` (el desplazamiento por
//! `wildOffset` se documenta únicamente aquí y se reintroduce en la
//! resolución de colisión, `k = T.dist - W.dist + wildOffset mod n`).

use crate::errors::MathError;
use crate::public_key::SafePublicKey;

/// El herd de origen de un kangaroo, derivado exclusivamente de la paridad de `kIdx`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HerdKind {
    /// Arranca en un punto conocido (`start·G`); paridad par de `kIdx`.
    Tame,
    /// Arranca en el objetivo desplazado (`P - wildOffset·G`); paridad impar.
    Wild,
}

impl HerdKind {
    /// `herd := kIdx & 1` — única fuente de verdad de la paridad, nunca transmitida
    /// explícitamente por cable (ver §6 del protocolo).
    #[inline]
    #[must_use]
    pub fn from_k_idx(k_idx: u64) -> Self {
        if k_idx & 1 == 0 {
            HerdKind::Tame
        } else {
            HerdKind::Wild
        }
    }
}

/// Un caminante individual. Mutado exclusivamente por el lane que lo posee;
/// nunca compartido entre hilos.
#[derive(Debug, Clone)]
pub struct Kangaroo {
    /// Identificador único; su bit bajo es la única fuente de verdad del herd.
    pub k_idx: u64,
    /// Herd derivado de `k_idx`.
    pub herd: HerdKind,
    /// Posición actual en la curva.
    pub pos: SafePublicKey,
    /// Distancia acumulada (≤192 bits útiles, almacenada en 32 bytes por
    /// reutilización directa de las rutinas u256 de [`crate::arithmetic`]).
    pub dist: [u8; 32],

    reset_pos: SafePublicKey,
    reset_dist: [u8; 32],

    /// Último DP emitido por este kangaroo (x, dist); usado para detectar
    /// ramas muertas que repiten el mismo DP sin avanzar el store.
    pub(crate) last_dp: Option<([u8; 32], [u8; 32])>,
}

impl Kangaroo {
    fn new(k_idx: u64, pos: SafePublicKey, dist: [u8; 32]) -> Self {
        Self {
            k_idx,
            herd: HerdKind::from_k_idx(k_idx),
            pos,
            dist,
            reset_pos: pos,
            reset_dist: dist,
            last_dp: None,
        }
    }

    /// Reinicia el kangaroo a su posición/distancia base, asignándole un
    /// `kIdx` nuevo que preserva la paridad (rama muerta detectada en
    /// `walk::step`).
    pub fn reset(&mut self, next_k_idx: u64) {
        debug_assert_eq!(
            next_k_idx & 1,
            self.k_idx & 1,
            "kIdx reassignment must preserve herd parity"
        );
        self.k_idx = next_k_idx;
        self.herd = HerdKind::from_k_idx(next_k_idx);
        self.pos = self.reset_pos;
        self.dist = self.reset_dist;
        self.last_dp = None;
    }
}

/// Administra un cohort de kangaroos con sus contadores de `kIdx` libres.
pub struct Herd {
    kangaroos: Vec<Kangaroo>,
    next_even_k_idx: u64,
    next_odd_k_idx: u64,
}

impl Herd {
    /// Crea `n` kangaroos (truncado hacia abajo al par más cercano) partidos
    /// 50/50 por paridad de `kIdx`, per §4.C.
    ///
    /// `start`: escalar big-endian desde el que arrancan los tame.
    /// `target`: el punto público `P` a resolver.
    /// `wild_offset`: el escalar big-endian del punto medio del intervalo.
    pub fn spawn(
        n: usize,
        start: &[u8; 32],
        target: &SafePublicKey,
        wild_offset: &[u8; 32],
    ) -> Result<Self, MathError> {
        Self::spawn_with_namespace(n, start, target, wild_offset, 0)
    }

    /// Como [`Herd::spawn`], pero arranca la numeración de `kIdx` en
    /// `k_idx_base` (redondeado hacia abajo al par más cercano) en vez de
    /// cero. Un worker con varios lanes de cómputo, cada uno dueño de su
    /// propio `Herd`, reserva una banda disjunta de `kIdx` por lane para
    /// que un `RESET_KANGAROO` recibido del servidor se pueda enrutar sin
    /// ambigüedad al lane y al slot correctos.
    pub fn spawn_with_namespace(
        n: usize,
        start: &[u8; 32],
        target: &SafePublicKey,
        wild_offset: &[u8; 32],
        k_idx_base: u64,
    ) -> Result<Self, MathError> {
        let paired = n / 2;
        let tame_base = SafePublicKey::from_scalar_times_generator(start)?;
        let wild_offset_point = SafePublicKey::from_scalar_times_generator(wild_offset)?;
        let wild_base = target.combine(&wild_offset_point.negate())?;

        let mut kangaroos = Vec::with_capacity(paired * 2);
        let base = k_idx_base & !1;
        let mut next_even_k_idx = base;
        let mut next_odd_k_idx = base + 1;

        for _ in 0..paired {
            kangaroos.push(Kangaroo::new(next_even_k_idx, tame_base, *start));
            next_even_k_idx += 2;

            kangaroos.push(Kangaroo::new(next_odd_k_idx, wild_base, [0u8; 32]));
            next_odd_k_idx += 2;
        }

        Ok(Self { kangaroos, next_even_k_idx, next_odd_k_idx })
    }

    /// Acceso mutable al cohort completo, iterado por el lane propietario.
    pub fn kangaroos_mut(&mut self) -> &mut [Kangaroo] {
        &mut self.kangaroos
    }

    /// Acceso de solo lectura, usado por telemetría y pruebas.
    #[must_use]
    pub fn kangaroos(&self) -> &[Kangaroo] {
        &self.kangaroos
    }

    /// Reinicia el kangaroo en `slot`, asignándole el siguiente `kIdx` libre
    /// de su propia paridad.
    pub fn reset_at(&mut self, slot: usize) {
        let parity = self.kangaroos[slot].k_idx & 1;
        let next_k_idx = if parity == 0 {
            let value = self.next_even_k_idx;
            self.next_even_k_idx += 2;
            value
        } else {
            let value = self.next_odd_k_idx;
            self.next_odd_k_idx += 2;
            value
        };
        self.kangaroos[slot].reset(next_k_idx);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.kangaroos.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kangaroos.is_empty()
    }
}

// FIN DEL ARCHIVO [libs/core/math-engine/src/kangaroo/herd.rs]
