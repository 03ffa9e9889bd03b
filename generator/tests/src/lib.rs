#[cfg(test)]
mod reg_map_tests {
    use radio_regmap::reg_if::*;
    use radio_regmap::RegError;

    reg_map! {
        pub MODEM(0x4008_6000, "revA2") {
            CTRL0(RW): 0x0, 0x5, 0xffff_ffff {
                FDM0DIFFDIS(RW): 0, 0;
                MAPFSK(RW): 5, 3;
                CODING(RW){nrz: 0, manchester: 1, dsss: 2, linecode: 3}: 7, 6;
            };
            STATUS(RO): 0x4, 0x0, 0x0 {
                DEMODSTATE(RO){off: 0, timingsearch: 1}: 2, 0;
            };
            CMD(WO, aliased): 0x8, 0x0, 0x3f {
                PRESTOP(WO): 0, 0;
                CHPWRACCUCLR(WO): 1, 1;
            };
            IEN(RW, aliased): 0xc, 0x0, 0xff {
                TXFRAMESENT(RW): 0, 0;
                RXPRESDET(RW): 5, 5;
            };
        }
    }

    reg_map! {
        RAC(0x4008_4000) {
            R0(RW): 0x48, 0x0, 0xffff_ffff {
                VALUE(RW): 31, 0;
            };
        }
    }

    #[test]
    fn layout() {
        assert_eq!(MODEM.peripheral, "MODEM");
        assert_eq!(MODEM.revision, "revA2");
        assert_eq!(RAC.revision, "");
        MODEM.validate().unwrap();
        RAC.validate().unwrap();
        let ctrl = MODEM.lookup("CTRL0").unwrap();
        assert_eq!(ctrl.address(), 0x4008_6000);
        assert_eq!(ctrl.fields_mask(), 0xf9);
        let coding = ctrl.field("CODING").unwrap();
        assert_eq!((coding.bit_offset, coding.bit_width), (6, 2));
        assert_eq!(coding.mask(), 0xc0);
        assert_eq!(
            MODEM.find_by_address(0x4008_600c).map(|r| r.name),
            Some("IEN")
        );
        assert!(matches!(
            MODEM.lookup("CTRL9"),
            Err(RegError::NotFound { .. })
        ));
    }

    #[test]
    fn field_access() {
        let bus = SimBus::for_map(&MODEM);
        let ctrl = MODEM.lookup("CTRL0").unwrap();
        assert_eq!(ctrl.get_field("FDM0DIFFDIS", &bus).unwrap(), 1);
        assert_eq!(ctrl.get_field("MAPFSK", &bus).unwrap(), 0);
        let coding = ctrl.field("CODING").unwrap();
        let dsss = coding.enum_value("DSSS").unwrap();
        ctrl.set_field("CODING", dsss, &bus).unwrap();
        assert_eq!(ctrl.read(&bus).unwrap(), 0x85);
        assert_eq!(coding.enum_name(ctrl.get_field("CODING", &bus).unwrap()), Some("dsss"));
        assert!(matches!(
            ctrl.set_field("MAPFSK", 8, &bus),
            Err(RegError::OutOfRange { value: 8, width: 3, .. })
        ));
        assert_eq!(ctrl.read(&bus).unwrap(), 0x85);
    }

    #[test]
    fn access_rules() {
        let bus = SimBus::for_map(&MODEM);
        let status = MODEM.lookup("STATUS").unwrap();
        bus.poke(status.address(), 0x1);
        assert_eq!(status.get_field("DEMODSTATE", &bus).unwrap(), 1);
        assert!(matches!(
            status.write(&bus, 0),
            Err(RegError::UnsupportedOperation { .. })
        ));
        let cmd = MODEM.lookup("CMD").unwrap();
        assert!(matches!(
            cmd.read(&bus),
            Err(RegError::UnsupportedOperation { .. })
        ));
        cmd.set_field("CHPWRACCUCLR", 1, &bus).unwrap();
        assert_eq!(bus.peek(cmd.address()), Some(0x2));
    }

    #[test]
    fn alias_windows() {
        let bus = SimBus::for_map(&MODEM);
        let ien = MODEM.lookup("IEN").unwrap();
        ien.set_bits(0x21, &bus).unwrap();
        assert_eq!(ien.read(&bus).unwrap(), 0x21);
        ien.clear_bits(0x1, &bus).unwrap();
        assert_eq!(ien.read(&bus).unwrap(), 0x20);
        ien.toggle_bits(0x101, &bus).unwrap();
        assert_eq!(ien.read(&bus).unwrap(), 0x21);
        let r0 = RAC.lookup("R0").unwrap();
        let rac_bus = SimBus::for_map(&RAC);
        r0.set_bits(0xf0, &rac_bus).unwrap();
        r0.toggle_bits(0x30, &rac_bus).unwrap();
        assert_eq!(r0.read(&rac_bus).unwrap(), 0xc0);
    }

    #[test]
    fn c_header() {
        let mut out = vec![];
        MODEM.gen_header(&HeaderType::C, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        println!("{}", out);
        assert!(out.contains("#define MODEM_BASE 0x40086000"));
        assert!(out.contains("#define MODEM_IEN_SET_ADDR 0x4008700c"));
        assert!(out.contains("#define MODEM_CTRL0_CODING_POS 6"));
        assert!(out.contains("//Enum: nrz : 0x0; manchester : 0x1; dsss : 0x2; linecode : 0x3;"));
    }
}

#[cfg(test)]
mod sequence_tests {
    use radio_regmap::reg_if::sequence::*;
    use radio_regmap::reg_if::*;

    reg_map! {
        SYNTH(0x4008_3000) {
            FREQ(RW): 0x0, 0x0, 0x0fff_ffff {
                FREQ(RW): 27, 0;
            };
            IFFREQ(RW): 0x4, 0x0, 0x001f_ffff {
                IFFREQ(RW): 19, 0;
                LOSIDE(RW): 20, 20;
            };
            CHSP(RW): 0x8, 0x0, 0x0003_ffff {
                CHSP(RW): 17, 0;
            };
        }
    }

    #[test]
    fn unprotected_run() {
        let mut seq = WriteSequence::new();
        seq.write(SYNTH.lookup("FREQ").unwrap(), 0x0123_4567).unwrap();
        seq.write(SYNTH.lookup("IFFREQ").unwrap(), 0x1_0000).unwrap();
        seq.write_field(SYNTH.lookup("IFFREQ").unwrap(), "LOSIDE", 1).unwrap();
        assert_eq!(seq.len(), 2);
        let actions = seq.actions(&Protection::new());
        assert_eq!(actions.len(), 1);
        match &actions[0] {
            BusAction::Write { address, values, .. } => {
                assert_eq!(*address, 0x4008_3000);
                assert_eq!(values, &vec![0x0123_4567, 0x11_0000]);
            }
            a => panic!("unexpected {:?}", a),
        }
        let bus = SimBus::for_map(&SYNTH);
        seq.apply(&Protection::new(), &bus).unwrap();
        assert_eq!(bus.peek(0x4008_3004), Some(0x11_0000));
    }
}
